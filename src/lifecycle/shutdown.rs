/* src/lifecycle/shutdown.rs */

use std::fmt::Display;

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::BoxError;

type Action = Box<dyn FnOnce() -> Result<(), BoxError> + Send>;

/// Ordered chain of teardown actions, drained last-registered-first.
pub struct Shutdown {
	actions: Mutex<Vec<(String, Action)>>,
	/// Held from the start of an exit until the process ends, so concurrent
	/// exits cannot cut a running chain short.
	exit_lock: Mutex<()>,
}

impl Shutdown {
	pub fn new() -> Self {
		Self {
			actions: Mutex::new(Vec::new()),
			exit_lock: Mutex::new(()),
		}
	}

	/// Appends a teardown action.
	pub fn push<F, E>(&self, name: impl Into<String>, action: F)
	where
		F: FnOnce() -> Result<(), E> + Send + 'static,
		E: Into<BoxError>,
	{
		self.actions
			.lock()
			.push((name.into(), Box::new(move || action().map_err(Into::into))));
	}

	pub fn len(&self) -> usize {
		self.actions.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.actions.lock().is_empty()
	}

	/// Runs and removes every action, newest first. A failing action is
	/// logged and the rest still run. Returns the number of failures.
	pub fn run(&self) -> usize {
		let mut failed = 0;
		loop {
			// Pop under the lock, run outside it: actions may push.
			let Some((name, action)) = self.actions.lock().pop() else {
				break;
			};
			match action() {
				Ok(()) => debug!(action = %name, "shutdown action done"),
				Err(e) => {
					failed += 1;
					error!(action = %name, error = %e, "shutdown action failed");
				}
			}
		}
		failed
	}

	/// Runs the chain, then exits the process with `code`.
	pub fn exit(&self, code: i32) -> ! {
		let _guard = self.exit_lock.lock();
		self.run();
		std::process::exit(code)
	}

	/// Runs the chain, prints `err` to stderr, then exits with status 1.
	pub fn exit_err(&self, err: impl Display) -> ! {
		let _guard = self.exit_lock.lock();
		self.run();
		eprintln!("{err}");
		std::process::exit(1)
	}
}

impl Default for Shutdown {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Shutdown {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let actions = self.actions.lock();
		f.debug_struct("Shutdown")
			.field("actions", &actions.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>())
			.finish()
	}
}
