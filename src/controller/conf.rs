/* src/controller/conf.rs */

//!
//! The config store bound to one dotenv file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tracing::debug;

use super::{ConfError, Hooks, WatchState};
use crate::loader::{Items, Scan, Schema, parse_bool, parse_file};

/// Config store: a flat key/value map loaded from one dotenv file.
///
/// Every load replaces the whole map at once, so readers see either the old
/// map or the new one. Reads before the first successful load fail with
/// [`ConfError::NotLoaded`].
pub struct Conf {
	pub(crate) path: PathBuf,
	pub(crate) items: RwLock<Option<Arc<Items>>>,
	pub(crate) hooks: RwLock<Hooks>,
	/// Held across a whole reload tick so updaters in one tick see one map.
	/// Reentrant so that hooks and updaters may call `load` themselves.
	pub(crate) reload_lock: ReentrantMutex<()>,
	pub(crate) watch: Mutex<Option<WatchState>>,
}

impl Conf {
	/// Binds a store to `path`, made absolute against the current directory.
	///
	/// Nothing is read until [`load`](Conf::load).
	pub fn new(path: impl AsRef<Path>) -> Result<Self, ConfError> {
		let path = path.as_ref();
		let path = std::path::absolute(path).map_err(|source| ConfError::Path {
			path: path.to_path_buf(),
			source,
		})?;

		Ok(Self {
			path,
			items: RwLock::new(None),
			hooks: RwLock::new(Hooks::default()),
			reload_lock: ReentrantMutex::new(()),
			watch: Mutex::new(None),
		})
	}

	/// Absolute path of the bound file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads and parses the bound file, runs the loaded hook, then swaps the
	/// map in. A failure leaves the previously loaded map in place.
	pub fn load(&self) -> Result<(), ConfError> {
		let _tick = self.reload_lock.lock();
		self.load_locked()
	}

	pub(crate) fn load_locked(&self) -> Result<(), ConfError> {
		let mut items = parse_file(&self.path)?;

		let hook = self.hooks.read().on_loaded.clone();
		if let Some(hook) = hook {
			hook(&mut items);
		}

		debug!(path = ?self.path, keys = items.len(), "config loaded");
		*self.items.write() = Some(Arc::new(items));
		Ok(())
	}

	pub fn is_loaded(&self) -> bool {
		self.items.read().is_some()
	}

	/// Snapshot of the current map.
	pub fn items(&self) -> Result<Arc<Items>, ConfError> {
		self.items.read().clone().ok_or(ConfError::NotLoaded)
	}

	/// Decodes the current map into a `T` through its declared schema.
	pub fn scan<T: Scan>(&self) -> Result<T, ConfError> {
		let items = self.items()?;
		Ok(T::scan(&items)?)
	}

	/// Decodes the current map into `target` through an explicit schema.
	pub fn scan_with<T>(&self, schema: &Schema<T>, target: &mut T) -> Result<(), ConfError> {
		let items = self.items()?;
		schema.decode(&items, target)?;
		Ok(())
	}

	/// Raw value of `key`, `None` if absent.
	pub fn get(&self, key: &str) -> Result<Option<String>, ConfError> {
		Ok(self.items()?.get(key).cloned())
	}

	pub fn keys(&self) -> Result<Vec<String>, ConfError> {
		Ok(self.items()?.keys().cloned().collect())
	}

	/// Value of `key`.
	///
	/// # Panics
	///
	/// Panics if nothing is loaded, or if the key is absent or blank.
	pub fn must_get(&self, key: &str) -> String {
		let items = match self.items() {
			Ok(items) => items,
			Err(_) => panic!("config unloaded"),
		};
		match items.get(key) {
			Some(value) if !value.trim().is_empty() => value.clone(),
			_ => panic!("config {key} undefined"),
		}
	}

	/// # Panics
	///
	/// Same as [`must_get`](Conf::must_get), and if the value is not an integer.
	pub fn must_get_int(&self, key: &str) -> i64 {
		let value = self.must_get(key);
		match value.trim().parse() {
			Ok(n) => n,
			Err(_) => panic!("config {key} convert to int failed"),
		}
	}

	/// `false`, `0` and empty (any case) are false, anything else is true.
	///
	/// # Panics
	///
	/// Same as [`must_get`](Conf::must_get).
	pub fn must_get_bool(&self, key: &str) -> bool {
		parse_bool(self.must_get(key).trim())
	}
}

impl std::fmt::Debug for Conf {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Conf")
			.field("path", &self.path)
			.field("loaded", &self.is_loaded())
			.field("updaters", &self.hooks.read().updaters.len())
			.field("watching", &self.watch.lock().is_some())
			.finish_non_exhaustive()
	}
}
