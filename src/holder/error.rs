/* src/holder/error.rs */

use crate::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum HoldError {
	/// The container was closed; no further checkout or update is legal.
	#[error("container is closed")]
	Closed,
	/// `close()` was called on a container that is already closed.
	#[error("container is already closed")]
	AlreadyClosed,
	/// A callback required by the requested operation was not supplied.
	#[error("{0} callback is not set")]
	MissingCallback(&'static str),
	/// Fetching the typed config failed.
	#[error("fetch config: {0}")]
	Fetch(#[source] BoxError),
	/// Comparing the stored config with the new one failed.
	#[error("compare config: {0}")]
	Compare(#[source] BoxError),
	/// Constructing a new object from config failed.
	#[error("construct object: {0}")]
	Construct(#[source] BoxError),
	/// Adjusting the current object in place failed.
	#[error("reset object: {0}")]
	Reset(#[source] BoxError),
	/// Closing the current object during container shutdown failed.
	#[error("close object: {0}")]
	Close(#[source] BoxError),
}
