/* src/controller/dispatch.rs */

//!
//! Updater registration, hooks and the reload tick.

use std::sync::Arc;

use tracing::{debug, error};

use super::{Conf, ConfError, Updater};
use crate::loader::Items;

type LoadedHook = Arc<dyn Fn(&mut Items) + Send + Sync>;
type UpdateHook = Arc<dyn Fn() + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(ConfError) + Send + Sync>;

/// Everything a reload tick calls out to. Cloned per tick so callbacks may
/// register more without deadlocking.
#[derive(Clone, Default)]
pub(crate) struct Hooks {
	pub(crate) updaters: Vec<Arc<dyn Updater>>,
	pub(crate) on_loaded: Option<LoadedHook>,
	pub(crate) before_update: Vec<UpdateHook>,
	pub(crate) after_update: Vec<UpdateHook>,
	pub(crate) on_error: Option<ErrorHandler>,
}

impl Conf {
	/// Registers an updater. Updaters run in registration order on every
	/// reload tick.
	pub fn push_updater(&self, updater: Arc<dyn Updater>) {
		self.hooks.write().updaters.push(updater);
	}

	/// Sets the hook run on every freshly parsed map before it is installed.
	/// It may rewrite values. Replaces any previous hook.
	pub fn on_loaded<F>(&self, hook: F)
	where
		F: Fn(&mut Items) + Send + Sync + 'static,
	{
		self.hooks.write().on_loaded = Some(Arc::new(hook));
	}

	/// Appends a hook run after a reload, before the updaters.
	pub fn before_update<F>(&self, hook: F)
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.hooks.write().before_update.push(Arc::new(hook));
	}

	/// Appends a hook run after the updaters.
	pub fn after_update<F>(&self, hook: F)
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.hooks.write().after_update.push(Arc::new(hook));
	}

	/// Sets the single handler receiving reload, updater and watch errors.
	/// Without one, those errors are logged.
	pub fn on_error<F>(&self, handler: F)
	where
		F: Fn(ConfError) + Send + Sync + 'static,
	{
		self.hooks.write().on_error = Some(Arc::new(handler));
	}

	pub(crate) fn report(&self, err: ConfError) {
		let handler = self.hooks.read().on_error.clone();
		match handler {
			Some(handler) => handler(err),
			None => error!(path = ?self.path, error = %err, "config reload error"),
		}
	}

	/// Runs one reload tick: load, before hooks, updaters, after hooks.
	///
	/// A failed load is reported and ends the tick. A failing updater is
	/// reported and the remaining updaters still run. Returns the number of
	/// errors reported.
	pub fn reload(&self) -> usize {
		let _tick = self.reload_lock.lock();

		if let Err(e) = self.load_locked() {
			self.report(e);
			return 1;
		}

		let hooks = self.hooks.read().clone();
		let mut failed = 0;

		for hook in &hooks.before_update {
			hook();
		}

		for updater in &hooks.updaters {
			if let Err(source) = updater.update() {
				failed += 1;
				self.report(ConfError::Update {
					name: updater.name().to_string(),
					source,
				});
			}
		}

		for hook in &hooks.after_update {
			hook();
		}

		debug!(path = ?self.path, updaters = hooks.updaters.len(), failed, "reload tick done");
		failed
	}
}
