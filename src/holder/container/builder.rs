/* src/holder/container/builder.rs */

use std::sync::atomic::AtomicBool;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;

use super::{CompareFn, ConstructFn, Container, FetchFn, ResetFn};
use crate::BoxError;
use crate::holder::slot::Slot;
use crate::holder::{Decision, HoldError, Resource};

/// Builder for [`Container`].
///
/// `fetch` and `construct` are mandatory. `compare` is needed only if the
/// container is ever updated, and `reset` only if `compare` can return
/// [`Decision::NeedReset`].
pub struct ContainerBuilder<R, C> {
	name: Option<String>,
	fetch: Option<FetchFn<C>>,
	compare: Option<CompareFn<C>>,
	construct: Option<ConstructFn<R, C>>,
	reset: Option<ResetFn<R, C>>,
}

impl<R, C> ContainerBuilder<R, C>
where
	R: Resource,
	C: Send + Sync + 'static,
{
	pub fn new() -> Self {
		Self {
			name: None,
			fetch: None,
			compare: None,
			construct: None,
			reset: None,
		}
	}

	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn fetch<F, E>(mut self, fetch: F) -> Self
	where
		F: Fn() -> Result<C, E> + Send + Sync + 'static,
		E: Into<BoxError>,
	{
		self.fetch = Some(Box::new(move || fetch().map_err(Into::into)));
		self
	}

	pub fn compare<F, E>(mut self, compare: F) -> Self
	where
		F: Fn(&C, &C) -> Result<Decision, E> + Send + Sync + 'static,
		E: Into<BoxError>,
	{
		self.compare = Some(Box::new(move |old, new| compare(old, new).map_err(Into::into)));
		self
	}

	pub fn construct<F, E>(mut self, construct: F) -> Self
	where
		F: Fn(&C) -> Result<R, E> + Send + Sync + 'static,
		E: Into<BoxError>,
	{
		self.construct = Some(Box::new(move |config| construct(config).map_err(Into::into)));
		self
	}

	pub fn reset<F, E>(mut self, reset: F) -> Self
	where
		F: Fn(&R, &C, &C) -> Result<(), E> + Send + Sync + 'static,
		E: Into<BoxError>,
	{
		self.reset = Some(Box::new(move |object, old, new| {
			reset(object, old, new).map_err(Into::into)
		}));
		self
	}

	/// Fetches the initial config and constructs the first object.
	///
	/// Either step failing aborts creation.
	pub fn build(self) -> Result<Container<R, C>, HoldError> {
		let fetch = self.fetch.ok_or(HoldError::MissingCallback("fetch"))?;
		let construct = self.construct.ok_or(HoldError::MissingCallback("construct"))?;
		let name = self.name.unwrap_or_else(|| std::any::type_name::<R>().to_string());

		let config = fetch().map_err(HoldError::Fetch)?;
		let resource = construct(&config).map_err(HoldError::Construct)?;
		debug!(container = %name, "constructed initial object");

		Ok(Container {
			name,
			current: ArcSwap::from_pointee(Slot::new(resource, config, 1)),
			fetch,
			compare: self.compare,
			construct,
			reset: self.reset,
			update_lock: Mutex::new(()),
			closed: AtomicBool::new(false),
		})
	}
}

impl<R, C> Default for ContainerBuilder<R, C>
where
	R: Resource,
	C: Send + Sync + 'static,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<R, C> Container<R, C>
where
	R: Resource,
	C: Send + Sync + 'static,
{
	pub fn builder() -> ContainerBuilder<R, C> {
		ContainerBuilder::new()
	}
}
