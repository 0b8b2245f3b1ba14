/* src/holder/container/checkout.rs */

use std::sync::atomic::Ordering;

use super::Container;
use crate::holder::{HoldError, Lease};

impl<R, C> Container<R, C> {
	/// Checks out the current object.
	///
	/// Never blocks on a concurrent `update`. Every lease must be returned,
	/// by dropping it or through [`put_back`](Container::put_back).
	///
	/// # Panics
	///
	/// Panics if the container has been closed. Using a torn-down container is
	/// a programming error; use [`try_checkout`](Container::try_checkout) where
	/// closure is an expected condition.
	pub fn checkout(&self) -> Lease<R, C> {
		match self.try_checkout() {
			Ok(lease) => lease,
			Err(e) => panic!("checkout on container '{}': {}", self.name, e),
		}
	}

	/// Checks out the current object, failing with [`HoldError::Closed`] after close.
	pub fn try_checkout(&self) -> Result<Lease<R, C>, HoldError> {
		loop {
			if self.closed.load(Ordering::SeqCst) {
				return Err(HoldError::Closed);
			}
			let slot = self.current.load_full();
			if slot.try_acquire() {
				return Ok(Lease { slot });
			}
			// Retired between load and acquire: either superseded, so the next
			// load sees the replacement, or closed, caught by the check above.
			std::hint::spin_loop();
		}
	}

	/// Returns a lease. Equivalent to dropping it.
	pub fn put_back(&self, lease: Lease<R, C>) {
		drop(lease);
	}
}
