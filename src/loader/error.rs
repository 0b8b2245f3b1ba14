/* src/loader/error.rs */

use std::path::PathBuf;

/// Core error type for the loader module.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	/// The env file could not be read or parsed.
	#[error("read env file {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: dotenvy::Error,
	},

	/// In-memory env text could not be parsed.
	#[error("parse env text: {0}")]
	Parse(#[source] dotenvy::Error),

	/// A required key is absent or blank.
	#[error("field {key} is not present in source")]
	MissingField { key: String },

	/// A present value does not convert to the declared field type.
	#[error("field {key}: cannot convert {value:?} to {expected}")]
	InvalidValue {
		key: String,
		value: String,
		expected: &'static str,
	},
}
