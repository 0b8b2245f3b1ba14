/* src/holder/slot.rs */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use arc_swap::ArcSwap;
use parking_lot::{Condvar, Mutex};

/// One object generation held by a container.
///
/// The lease count and the retired flag form the drain protocol: a lease is
/// only valid if it was taken while the slot was not retired, and `drain`
/// returns once the slot is retired and the count has reached zero.
pub(crate) struct Slot<R, C> {
	pub(crate) resource: R,
	pub(crate) config: ArcSwap<C>,
	pub(crate) generation: u64,
	leases: AtomicUsize,
	retired: AtomicBool,
	waiter: Mutex<()>,
	drained: Condvar,
}

impl<R, C> Slot<R, C> {
	pub(crate) fn new(resource: R, config: C, generation: u64) -> Self {
		Self {
			resource,
			config: ArcSwap::from_pointee(config),
			generation,
			leases: AtomicUsize::new(0),
			retired: AtomicBool::new(false),
			waiter: Mutex::new(()),
			drained: Condvar::new(),
		}
	}

	/// Takes a lease unless the slot has been retired.
	///
	/// Increment-then-check pairs with `drain`'s store-then-load (both SeqCst),
	/// so either the drainer observes this lease or this call observes the
	/// retirement and backs out.
	pub(crate) fn try_acquire(&self) -> bool {
		self.leases.fetch_add(1, Ordering::SeqCst);
		if self.retired.load(Ordering::SeqCst) {
			self.release();
			return false;
		}
		true
	}

	pub(crate) fn release(&self) {
		let prev = self.leases.fetch_sub(1, Ordering::SeqCst);
		debug_assert!(prev > 0, "lease released more times than acquired");
		if prev == 1 && self.retired.load(Ordering::SeqCst) {
			let _guard = self.waiter.lock();
			self.drained.notify_all();
		}
	}

	/// Retires the slot and blocks until every outstanding lease is returned.
	pub(crate) fn drain(&self) {
		self.retired.store(true, Ordering::SeqCst);
		let mut guard = self.waiter.lock();
		while self.leases.load(Ordering::SeqCst) > 0 {
			self.drained.wait(&mut guard);
		}
	}

	pub(crate) fn leases(&self) -> usize {
		self.leases.load(Ordering::SeqCst)
	}

	#[cfg(test)]
	pub(crate) fn is_retired(&self) -> bool {
		self.retired.load(Ordering::SeqCst)
	}

	pub(crate) fn config(&self) -> Arc<C> {
		self.config.load_full()
	}
}
