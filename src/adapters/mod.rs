/* src/adapters/mod.rs */

//!
//! Resource kinds built on [`Container`](crate::holder::Container).
//!
//! Each adapter supplies the container callbacks for its kind and exposes
//! kind-specific operations that check out, operate and return. The logger
//! absorbs every change in place; the HTTP client is replaced on any change.

pub mod http;
pub mod log;
