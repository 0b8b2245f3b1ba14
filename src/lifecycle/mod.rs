/* src/lifecycle/mod.rs */

//! Process teardown.
//!
//! [`Shutdown`] is an explicit application-context value: components push
//! their teardown actions onto it at setup, and the process drains it on
//! interrupt, terminate or hang-up, or on an explicit exit.

mod shutdown;
mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
