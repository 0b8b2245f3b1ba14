/* src/lifecycle/signals.rs */

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use super::Shutdown;

/// Waits for SIGINT, SIGTERM or SIGHUP and returns the signal's name.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
	use tokio::signal::unix::{SignalKind, signal};

	let mut interrupt = signal(SignalKind::interrupt())?;
	let mut terminate = signal(SignalKind::terminate())?;
	let mut hangup = signal(SignalKind::hangup())?;

	let name = tokio::select! {
		_ = interrupt.recv() => "SIGINT",
		_ = terminate.recv() => "SIGTERM",
		_ = hangup.recv() => "SIGHUP",
	};
	Ok(name)
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
	tokio::signal::ctrl_c().await?;
	Ok("ctrl-c")
}

impl Shutdown {
	/// Spawns a task that runs the chain and exits with status 0 on the
	/// first termination signal.
	///
	/// Must be called within a tokio runtime.
	pub fn listen(self: &Arc<Self>) -> JoinHandle<()> {
		let shutdown = Arc::clone(self);
		tokio::spawn(async move {
			match wait_for_signal().await {
				Ok(signal) => {
					info!(signal, "received signal, shutting down");
					// Actions may block while draining leases held by other tasks.
					if let Err(e) = tokio::task::spawn_blocking(move || exit_on_signal(&shutdown)).await {
						error!(error = %e, "shutdown chain did not complete");
					}
				}
				Err(e) => error!(error = %e, "failed to install signal handlers"),
			}
		})
	}
}

fn exit_on_signal(shutdown: &Shutdown) {
	shutdown.exit(0)
}
