/* src/loader/mod.rs */

//!
//! Dotenv parsing and explicit-schema decoding.

mod dotenv;
mod error;
mod schema;
mod value;

pub use dotenv::{Items, parse_file, parse_str};
pub use error::LoadError;
pub use schema::{Scan, Schema};
pub use value::{FromValue, parse_bool};
