/* src/controller/watch.rs */

//!
//! Live reloading of the bound file.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use super::{Conf, ConfError, WatchState};
use crate::signal::{Config as WatcherConfig, Event, Watcher};

impl Conf {
	/// Starts watching the bound file with the default watcher config.
	///
	/// See [`watch_with`](Conf::watch_with).
	pub fn watch(self: &Arc<Self>) -> Result<(), ConfError> {
		self.watch_with(WatcherConfig::default())
	}

	/// Starts watching the directory of the bound file. Each debounced create
	/// or write of the file runs one [`reload`](Conf::reload) tick on the
	/// blocking pool; deletion alone never reloads.
	///
	/// Must be called within a tokio runtime. Only one watch may be active;
	/// a second call fails with [`ConfError::AlreadyWatching`].
	pub fn watch_with(self: &Arc<Self>, config: WatcherConfig) -> Result<(), ConfError> {
		let mut state = self.watch.lock();
		if state.is_some() {
			return Err(ConfError::AlreadyWatching);
		}

		let watcher = Watcher::new(self.path.clone(), config)?;
		let mut rx = watcher.subscribe();
		let conf = Arc::downgrade(self);

		let handle = tokio::spawn(async move {
			loop {
				let event = rx.recv().await;
				let Some(conf) = conf.upgrade() else {
					break;
				};

				match event {
					Ok(Event::Changed(change)) => {
						debug!(path = ?change.path, kind = ?change.kind, "config file changed");
						tick(conf).await;
					}
					Err(RecvError::Lagged(skipped)) => {
						warn!(skipped, "watch events lagged, reloading");
						tick(conf).await;
					}
					Ok(Event::Error(e)) => conf.report(ConfError::Watch(e)),
					Err(RecvError::Closed) => break,
				}
			}
		});

		info!(path = ?self.path, "watching config file");
		*state = Some(WatchState {
			watcher,
			abort_handle: handle.abort_handle(),
		});
		Ok(())
	}

	/// Stops the active watch. No-op if none is active. A reload tick already
	/// running is not interrupted.
	pub fn close_watch(&self) {
		if let Some(state) = self.watch.lock().take() {
			info!(path = ?state.watcher.path(), "stopped watching config file");
		}
	}

	pub fn is_watching(&self) -> bool {
		self.watch.lock().is_some()
	}

	/// Stops watching. Present so the store can sit in a shutdown chain.
	pub fn close(&self) -> Result<(), ConfError> {
		self.close_watch();
		Ok(())
	}
}

async fn tick(conf: Arc<Conf>) {
	if let Err(e) = tokio::task::spawn_blocking(move || conf.reload()).await {
		error!(error = %e, "reload tick did not complete");
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use parking_lot::Mutex;

	use super::*;
	use crate::signal::SignalError;

	async fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
		for _ in 0..250 {
			if cond() {
				return true;
			}
			tokio::time::sleep(Duration::from_millis(20)).await;
		}
		cond()
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn watch_errors_reach_the_handler_and_watching_continues() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("app.env");
		std::fs::write(&path, "MODE=a\n").unwrap();

		let conf = Arc::new(Conf::new(&path).unwrap());
		conf.load().unwrap();
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		conf.on_error(move |e| sink.lock().push(e));
		conf.watch().unwrap();

		let delivered = conf.watch.lock().as_ref().map(|state| {
			state.watcher.emit(Event::Error(Arc::new(SignalError::Notify(
				notify::Error::generic("backend hiccup"),
			))))
		});
		assert_eq!(delivered, Some(1));

		assert!(wait_for(|| !seen.lock().is_empty()).await);
		match &seen.lock()[0] {
			ConfError::Watch(e) => assert!(e.to_string().contains("backend hiccup")),
			other => panic!("expected watch error, got {other:?}"),
		}
		assert!(conf.is_watching());

		tokio::time::sleep(Duration::from_millis(100)).await;
		std::fs::write(&path, "MODE=b\n").unwrap();
		assert!(wait_for(|| conf.get("MODE").ok().flatten().as_deref() == Some("b")).await);
		assert_eq!(seen.lock().len(), 1);

		conf.close_watch();
	}
}
