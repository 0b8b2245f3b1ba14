/* src/signal/worker.rs */

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use tokio::sync::{broadcast, mpsc};

use super::{Change, Config, Event, EventKind, SignalError};

struct DebounceState {
	path: PathBuf,
	last_seen: Instant,
	kind: EventKind,
}

pub(crate) async fn process_events(
	mut raw_rx: mpsc::Receiver<notify::Result<notify::Event>>,
	user_tx: broadcast::Sender<Event>,
	file_name: OsString,
	config: Config,
) {
	let mut pending: Option<DebounceState> = None;

	let tick_rate = if config.debounce < Duration::from_millis(50) {
		config.debounce
	} else {
		config.debounce / 5
	}
	.max(Duration::from_millis(1));

	let mut interval = tokio::time::interval(tick_rate);

	loop {
		tokio::select! {
			maybe_event = raw_rx.recv() => {
				match maybe_event {
					Some(Ok(event)) => handle_raw_event(event, &mut pending, &file_name),
					Some(Err(e)) => {
						tracing::error!(error = %e, "notify error");
						let _ = user_tx.send(Event::Error(Arc::new(SignalError::Notify(e))));
					}
					None => break,
				}
			}
			_ = interval.tick() => {
				flush_pending(&mut pending, &user_tx, &config);
			}
		}
	}
}

/// Maps a raw event to per-path kinds. Renames count as removal of the
/// source name and creation of the target name.
fn classify(event: &notify::Event, index: usize) -> Option<EventKind> {
	use notify::EventKind as NK;
	match event.kind {
		NK::Create(_) => Some(EventKind::Create),
		NK::Remove(_) => Some(EventKind::Remove),
		NK::Modify(ModifyKind::Metadata(_)) => None,
		NK::Modify(ModifyKind::Name(RenameMode::From)) => Some(EventKind::Remove),
		NK::Modify(ModifyKind::Name(RenameMode::To)) => Some(EventKind::Create),
		NK::Modify(ModifyKind::Name(RenameMode::Both)) => Some(if index == 0 {
			EventKind::Remove
		} else {
			EventKind::Create
		}),
		NK::Modify(_) => Some(EventKind::Modify),
		_ => None,
	}
}

fn handle_raw_event(
	event: notify::Event,
	pending: &mut Option<DebounceState>,
	file_name: &OsString,
) {
	for (index, path) in event.paths.iter().enumerate() {
		if path.file_name() != Some(file_name.as_os_str()) {
			continue;
		}
		let Some(kind) = classify(&event, index) else {
			continue;
		};

		let now = Instant::now();
		match pending {
			Some(state) => {
				state.last_seen = now;
				match (state.kind, kind) {
					(EventKind::Create, EventKind::Modify) => { /* Keep Create */ }
					(EventKind::Remove, EventKind::Modify) => {
						// Ignore noise
					}
					_ => {
						state.kind = kind;
					}
				}
			}
			None => {
				*pending = Some(DebounceState {
					path: path.clone(),
					last_seen: now,
					kind,
				});
			}
		}
	}
}

fn flush_pending(
	pending: &mut Option<DebounceState>,
	tx: &broadcast::Sender<Event>,
	config: &Config,
) {
	let ready = pending
		.as_ref()
		.is_some_and(|state| state.last_seen.elapsed() >= config.debounce);
	if !ready {
		return;
	}

	if let Some(state) = pending.take() {
		if config.listen_events.contains(&state.kind) {
			let _ = tx.send(Event::Changed(Change {
				path: state.path,
				kind: state.kind,
			}));
		} else {
			tracing::debug!(path = ?state.path, kind = ?state.kind, "dropped unlistened event");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use notify::event::{CreateKind, DataChange, RemoveKind};

	fn raw(kind: notify::EventKind, path: &str) -> notify::Event {
		notify::Event::new(kind).add_path(PathBuf::from(path))
	}

	#[test]
	fn other_files_are_ignored() {
		let mut pending = None;
		let name = OsString::from("app.env");
		handle_raw_event(
			raw(notify::EventKind::Create(CreateKind::File), "/tmp/x/other.env"),
			&mut pending,
			&name,
		);
		assert!(pending.is_none());
	}

	#[test]
	fn remove_then_create_coalesces_to_create() {
		let mut pending = None;
		let name = OsString::from("app.env");
		handle_raw_event(
			raw(notify::EventKind::Remove(RemoveKind::File), "/tmp/x/app.env"),
			&mut pending,
			&name,
		);
		handle_raw_event(
			raw(notify::EventKind::Create(CreateKind::File), "/tmp/x/app.env"),
			&mut pending,
			&name,
		);
		handle_raw_event(
			raw(
				notify::EventKind::Modify(ModifyKind::Data(DataChange::Any)),
				"/tmp/x/app.env",
			),
			&mut pending,
			&name,
		);
		assert_eq!(pending.map(|s| s.kind), Some(EventKind::Create));
	}

	#[tokio::test]
	async fn notify_errors_are_forwarded_and_watching_continues() {
		let (raw_tx, raw_rx) = mpsc::channel(4);
		let (tx, mut rx) = broadcast::channel(4);
		let config = Config {
			debounce: Duration::from_millis(10),
			..Config::default()
		};
		let worker = tokio::spawn(process_events(raw_rx, tx, OsString::from("app.env"), config));

		raw_tx
			.send(Err(notify::Error::generic("backend failed")))
			.await
			.unwrap();
		match rx.recv().await.unwrap() {
			Event::Error(e) => {
				assert!(matches!(&*e, SignalError::Notify(_)));
				assert!(e.to_string().contains("backend failed"));
			}
			other => panic!("expected error event, got {other:?}"),
		}

		raw_tx
			.send(Ok(raw(
				notify::EventKind::Create(CreateKind::File),
				"/tmp/x/app.env",
			)))
			.await
			.unwrap();
		match rx.recv().await.unwrap() {
			Event::Changed(change) => assert_eq!(change.kind, EventKind::Create),
			other => panic!("expected change event, got {other:?}"),
		}

		drop(raw_tx);
		worker.await.unwrap();
	}

	#[test]
	fn removal_is_not_emitted_by_default() {
		let (tx, mut rx) = broadcast::channel(4);
		let mut pending = Some(DebounceState {
			path: PathBuf::from("/tmp/x/app.env"),
			last_seen: Instant::now() - Duration::from_secs(1),
			kind: EventKind::Remove,
		});
		flush_pending(&mut pending, &tx, &Config::default());
		assert!(pending.is_none());
		assert!(rx.try_recv().is_err());
	}
}
