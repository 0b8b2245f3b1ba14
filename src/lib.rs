/* src/lib.rs */

//!
//! Live-reloadable shared resources driven by a single watched dotenv file.
//!
//! This crate integrates the following components:
//!
//! - **holder**: `Container<R, C>`, a hot-swappable holder for exactly one current
//!   resource object, with leased checkout and drain-then-close replacement.
//! - **loader**: dotenv parsing and explicit-schema scanning into typed structs.
//! - **signal**: directory-level filesystem monitoring for a single file.
//! - **controller**: `Conf`, the config store that reloads on change and drives
//!   registered updaters (every `Container` is one).
//! - **lifecycle**: `Shutdown`, an ordered teardown chain run on signals or exit.
//! - **adapters**: resource kinds built on the container (structured logger,
//!   pooled HTTP client).
//!
//! ## Feature Flags
//!
//! - `full` (default): Enables all features.
//! - `holder`, `loader`, `signal`: Leaf modules.
//! - `controller`: Enables `Conf` (requires `holder` + `loader` + `signal`).
//! - `lifecycle`: Enables the shutdown chain.
//! - `adapters`: Enables the logger and HTTP client adapters.
//!
//! ## Basic Usage
//!
//! See `demos/basic.rs` for a complete example.

/// Boxed error carried through user-supplied callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[cfg(feature = "holder")]
pub mod holder;

#[cfg(feature = "loader")]
pub mod loader;

#[cfg(feature = "signal")]
pub mod signal;

#[cfg(feature = "controller")]
pub mod controller;

#[cfg(feature = "lifecycle")]
pub mod lifecycle;

#[cfg(feature = "adapters")]
pub mod adapters;
