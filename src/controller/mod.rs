/* src/controller/mod.rs */

//!
//! The config store and its reload dispatch.
//!
//! [`Conf`] loads a dotenv file, serves typed reads, and, while watching,
//! reloads on change and calls every registered [`Updater`] in registration
//! order. Every [`Container`](crate::holder::Container) is an updater.

use tokio::task::AbortHandle;

use crate::signal::Watcher;

pub(crate) struct WatchState {
	pub watcher: Watcher,
	pub abort_handle: AbortHandle,
}

impl Drop for WatchState {
	fn drop(&mut self) {
		self.watcher.stop();
		self.abort_handle.abort();
	}
}

mod conf;
mod dispatch;
mod error;
mod updater;
mod watch;

pub(crate) use dispatch::Hooks;

pub use conf::Conf;
pub use error::ConfError;
pub use updater::Updater;
