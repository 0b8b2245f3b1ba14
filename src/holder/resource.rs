/* src/holder/resource.rs */

/// An object managed by a [`Container`](super::Container).
///
/// `close` may be called from a background thread once every lease on the
/// object has been returned. Implementations must tolerate being closed more
/// than once.
pub trait Resource: Send + Sync + 'static {
	type Error: std::error::Error + Send + Sync + 'static;

	fn close(&self) -> Result<(), Self::Error>;
}
