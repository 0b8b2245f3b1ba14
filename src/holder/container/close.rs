/* src/holder/container/close.rs */

use std::sync::atomic::Ordering;

use tracing::debug;

use super::Container;
use crate::holder::{HoldError, Resource};

impl<R, C> Container<R, C>
where
	R: Resource,
	C: Send + Sync + 'static,
{
	/// Closes the container and its current object.
	///
	/// Unlike replacement, this waits synchronously for outstanding leases to
	/// be returned and surfaces the object's close error. A second call fails
	/// with [`HoldError::AlreadyClosed`].
	pub fn close(&self) -> Result<(), HoldError> {
		let slot = {
			let _guard = self.update_lock.lock();
			if self.closed.swap(true, Ordering::SeqCst) {
				return Err(HoldError::AlreadyClosed);
			}
			self.current.load_full()
		};

		debug!(container = %self.name, leases = slot.leases(), "closing, draining leases");
		slot.drain();
		slot.resource
			.close()
			.map_err(|e| HoldError::Close(Box::new(e)))
	}
}
