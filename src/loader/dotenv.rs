/* src/loader/dotenv.rs */

use std::collections::HashMap;
use std::path::Path;

use super::LoadError;

/// Parsed `KEY=VALUE` pairs of one env file.
pub type Items = HashMap<String, String>;

/// Reads and parses a dotenv file.
///
/// Quoting, escapes, comments, `export` prefixes and `${VAR}` substitution
/// follow the usual dotenv conventions. Later duplicates win.
pub fn parse_file(path: &Path) -> Result<Items, LoadError> {
	let read_err = |source| LoadError::Read {
		path: path.to_path_buf(),
		source,
	};
	dotenvy::from_path_iter(path)
		.map_err(read_err)?
		.collect::<Result<Items, _>>()
		.map_err(read_err)
}

/// Parses dotenv text held in memory.
pub fn parse_str(text: &str) -> Result<Items, LoadError> {
	dotenvy::from_read_iter(text.as_bytes())
		.collect::<Result<Items, _>>()
		.map_err(LoadError::Parse)
}
