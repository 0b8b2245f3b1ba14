/* src/holder/mod.rs */

mod container;
mod decision;
mod error;
mod lease;
mod resource;
mod slot;

pub use container::{Container, ContainerBuilder};
pub use decision::Decision;
pub use error::HoldError;
pub use lease::Lease;
pub use resource::Resource;
