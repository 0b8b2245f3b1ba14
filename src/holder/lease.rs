/* src/holder/lease.rs */

use std::ops::Deref;
use std::sync::Arc;

use super::slot::Slot;

/// A checked-out reference to a container's object.
///
/// The object stays alive and open for as long as the lease exists, even if
/// the container installs a replacement in the meantime. Dropping the lease
/// returns it.
pub struct Lease<R, C> {
	pub(crate) slot: Arc<Slot<R, C>>,
}

impl<R, C> Lease<R, C> {
	/// The config snapshot associated with the leased object.
	pub fn config(&self) -> Arc<C> {
		self.slot.config()
	}

	/// Generation of the leased object; changes only on replacement.
	pub fn generation(&self) -> u64 {
		self.slot.generation
	}
}

impl<R, C> Deref for Lease<R, C> {
	type Target = R;

	fn deref(&self) -> &R {
		&self.slot.resource
	}
}

impl<R, C> Drop for Lease<R, C> {
	fn drop(&mut self) {
		self.slot.release();
	}
}

impl<R, C> std::fmt::Debug for Lease<R, C>
where
	R: std::fmt::Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Lease")
			.field("resource", &self.slot.resource)
			.field("generation", &self.slot.generation)
			.finish_non_exhaustive()
	}
}
