/* src/holder/container/mod.rs */

mod builder;
mod checkout;
mod close;
mod update;

pub use builder::ContainerBuilder;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use super::Decision;
use super::slot::Slot;
use crate::BoxError;

pub(crate) type FetchFn<C> = Box<dyn Fn() -> Result<C, BoxError> + Send + Sync>;
pub(crate) type CompareFn<C> = Box<dyn Fn(&C, &C) -> Result<Decision, BoxError> + Send + Sync>;
pub(crate) type ConstructFn<R, C> = Box<dyn Fn(&C) -> Result<R, BoxError> + Send + Sync>;
pub(crate) type ResetFn<R, C> = Box<dyn Fn(&R, &C, &C) -> Result<(), BoxError> + Send + Sync>;

/// Hot-swappable holder for exactly one current object of a resource kind.
///
/// Callers [`checkout`](Container::checkout) the current object and return the
/// lease when done. [`update`](Container::update) re-fetches the typed config
/// and either does nothing, adjusts the object in place, or installs a new
/// object; a superseded object is closed on a background thread once its last
/// lease is returned.
pub struct Container<R, C> {
	pub(crate) name: String,
	pub(crate) current: ArcSwap<Slot<R, C>>,
	pub(crate) fetch: FetchFn<C>,
	pub(crate) compare: Option<CompareFn<C>>,
	pub(crate) construct: ConstructFn<R, C>,
	pub(crate) reset: Option<ResetFn<R, C>>,
	/// Serializes `update` and `close`; never taken by checkout.
	pub(crate) update_lock: Mutex<()>,
	pub(crate) closed: AtomicBool,
}

impl<R, C> Container<R, C> {
	/// Name used in logs and reload error reports.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The config snapshot of the current object.
	pub fn config(&self) -> Arc<C> {
		self.current.load().config()
	}

	/// Generation of the current object. Starts at 1 and grows by one per replacement.
	pub fn generation(&self) -> u64 {
		self.current.load().generation
	}

	/// Number of leases outstanding on the current object.
	pub fn leases(&self) -> usize {
		self.current.load().leases()
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}
}

impl<R, C> std::fmt::Debug for Container<R, C>
where
	C: std::fmt::Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let slot = self.current.load();
		f.debug_struct("Container")
			.field("name", &self.name)
			.field("config", &slot.config())
			.field("generation", &slot.generation)
			.field("leases", &slot.leases())
			.field("closed", &self.is_closed())
			.finish_non_exhaustive()
	}
}
