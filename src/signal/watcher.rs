/* src/signal/watcher.rs */

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::worker::process_events;
use super::{Config, Event, Result, SignalError};

/// Watches one file through its parent directory.
pub struct Watcher {
	_internal_watcher: RecommendedWatcher,
	task_handle: JoinHandle<()>,
	event_tx: broadcast::Sender<Event>,
	path: PathBuf,
}

impl Watcher {
	/// Creates a new Watcher and starts monitoring immediately.
	///
	/// Must be called from within a tokio runtime.
	#[must_use = "Watcher must be kept alive"]
	pub fn new(file: impl Into<PathBuf>, config: Config) -> Result<Self> {
		let path = file.into();
		let runtime = tokio::runtime::Handle::try_current().map_err(|_| SignalError::NoRuntime)?;

		let file_name = path
			.file_name()
			.ok_or_else(|| SignalError::Config(format!("not a file path: {:?}", path)))?
			.to_os_string();
		let dir = match path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
			_ => PathBuf::from("."),
		};
		if !dir.is_dir() {
			return Err(SignalError::Config(format!(
				"directory does not exist: {:?}",
				dir
			)));
		}

		let (raw_tx, raw_rx) = mpsc::channel(100);
		let mut internal_watcher =
			notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
				let _ = raw_tx.blocking_send(res);
			})?;
		internal_watcher.watch(&dir, RecursiveMode::NonRecursive)?;

		let (user_tx, _) = broadcast::channel(100);
		let tx_clone = user_tx.clone();

		let task_handle = runtime.spawn(async move {
			process_events(raw_rx, tx_clone, file_name, config).await;
		});

		Ok(Self {
			_internal_watcher: internal_watcher,
			task_handle,
			event_tx: user_tx,
			path,
		})
	}

	pub fn subscribe(&self) -> broadcast::Receiver<Event> {
		self.event_tx.subscribe()
	}

	/// The watched file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn stop(&self) {
		self.task_handle.abort();
	}

	/// Delivers `event` to subscribers as if the worker had produced it.
	#[cfg(test)]
	pub(crate) fn emit(&self, event: Event) -> usize {
		self.event_tx.send(event).unwrap_or(0)
	}
}

impl Drop for Watcher {
	fn drop(&mut self) {
		self.task_handle.abort();
	}
}
