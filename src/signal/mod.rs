/* src/signal/mod.rs */

//!
//! Filesystem monitoring for a single file.
//!
//! The watch is placed on the file's parent directory, so replacing the file
//! by rename (as most editors do) is still observed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod watcher;
mod worker;

pub use watcher::Watcher;

/// Custom error type for the signal module.
#[derive(thiserror::Error, Debug)]
pub enum SignalError {
	#[error("notify error: {0}")]
	Notify(#[from] notify::Error),

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("watcher must be started inside a tokio runtime")]
	NoRuntime,
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, SignalError>;

/// Configuration for the watcher behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	/// Quiet period after the last raw event before a change is emitted.
	pub debounce: Duration,

	/// Event kinds that are emitted; others are dropped after coalescing.
	pub listen_events: Vec<EventKind>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			debounce: Duration::from_millis(100),
			listen_events: vec![EventKind::Create, EventKind::Modify],
		}
	}
}

/// The kind of filesystem event we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	/// File was created, or another file was renamed onto it.
	Create,
	/// File content was written.
	Modify,
	/// File was removed or renamed away.
	Remove,
}

/// A debounced change to the watched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
	pub path: PathBuf,
	pub kind: EventKind,
}

/// Message delivered to subscribers.
#[derive(Debug, Clone)]
pub enum Event {
	Changed(Change),
	/// The underlying watcher reported an error; watching continues.
	Error(Arc<SignalError>),
}
