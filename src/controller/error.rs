/* src/controller/error.rs */

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::BoxError;
use crate::loader::LoadError;
use crate::signal::SignalError;

/// Errors that can occur in the config store.
#[derive(Debug, Error)]
pub enum ConfError {
	/// A read was attempted before the first successful load.
	#[error("config content is not loaded")]
	NotLoaded,

	#[error("repeatedly watching")]
	AlreadyWatching,

	#[error("resolve path {path}: {source}")]
	Path {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("load config: {0}")]
	Load(#[from] LoadError),

	#[error("start watch: {0}")]
	Signal(#[from] SignalError),

	/// Reported by the running watcher; watching continues.
	#[error("watch file: {0}")]
	Watch(Arc<SignalError>),

	/// An updater failed during a reload tick.
	#[error("update {name}: {source}")]
	Update {
		name: String,
		#[source]
		source: BoxError,
	},
}
