/* src/holder/container/update.rs */

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::{debug, error, info, warn};

use super::Container;
use crate::holder::slot::Slot;
use crate::holder::{Decision, HoldError, Resource};

impl<R, C> Container<R, C>
where
	R: Resource,
	C: Send + Sync + 'static,
{
	/// Re-fetches the config and applies whatever the comparison decides.
	///
	/// Any error leaves the current object and its config untouched. On
	/// [`Decision::NeedReplace`] the new object is visible to every checkout
	/// issued after this returns; the superseded one is closed in the
	/// background once drained, and failures of that close are only logged.
	pub fn update(&self) -> Result<Decision, HoldError> {
		let _guard = self.update_lock.lock();

		if self.closed.load(Ordering::SeqCst) {
			return Err(HoldError::Closed);
		}
		let compare = self
			.compare
			.as_ref()
			.ok_or(HoldError::MissingCallback("compare"))?;

		let new_config = (self.fetch)().map_err(HoldError::Fetch)?;
		let slot = self.current.load_full();
		let old_config = slot.config();
		let decision = compare(&old_config, &new_config).map_err(HoldError::Compare)?;

		match decision {
			Decision::NoNeed => {}
			Decision::NeedReset => {
				let reset = self
					.reset
					.as_ref()
					.ok_or(HoldError::MissingCallback("reset"))?;
				reset(&slot.resource, &old_config, &new_config).map_err(HoldError::Reset)?;
				slot.config.store(Arc::new(new_config));
				debug!(container = %self.name, generation = slot.generation, "object reset in place");
			}
			Decision::NeedReplace => {
				let resource = (self.construct)(&new_config).map_err(HoldError::Construct)?;
				let generation = slot.generation + 1;
				self.current
					.store(Arc::new(Slot::new(resource, new_config, generation)));
				info!(container = %self.name, generation, "object replaced");
				self.dispose(slot);
			}
		}

		Ok(decision)
	}

	/// Drains and closes a superseded object without blocking the caller.
	fn dispose(&self, slot: Arc<Slot<R, C>>) {
		let name = self.name.clone();
		let spawned = std::thread::Builder::new()
			.name("livehold-dispose".to_string())
			.spawn(move || {
				slot.drain();
				match slot.resource.close() {
					Ok(()) => {
						debug!(container = %name, generation = slot.generation, "superseded object closed")
					}
					Err(e) => warn!(
						container = %name,
						generation = slot.generation,
						error = %e,
						"failed to close superseded object"
					),
				}
			});

		if let Err(e) = spawned {
			error!(
				container = %self.name,
				error = %e,
				"failed to spawn disposal thread, superseded object left unclosed"
			);
		}
	}
}
