/* src/controller/updater.rs */

use crate::BoxError;
use crate::holder::{Container, Resource};

/// Something refreshed after each reload of a [`Conf`](super::Conf).
pub trait Updater: Send + Sync {
	/// Name used when reporting failures.
	fn name(&self) -> &str {
		"updater"
	}

	fn update(&self) -> Result<(), BoxError>;
}

impl<R, C> Updater for Container<R, C>
where
	R: Resource,
	C: Send + Sync + 'static,
{
	fn name(&self) -> &str {
		Container::name(self)
	}

	fn update(&self) -> Result<(), BoxError> {
		Container::update(self)?;
		Ok(())
	}
}
