/* src/adapters/http.rs */

//! Pooled HTTP client that is rebuilt whenever its settings change.
//!
//! Connection pool and timeout settings are fixed when a `reqwest::Client` is
//! built, so any config difference replaces the client. Requests already in
//! flight keep the old client until they finish.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::BoxError;
use crate::holder::{Container, Decision, HoldError, Resource};
use crate::loader::Schema;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
	#[error("build client: {0}")]
	Build(#[source] reqwest::Error),

	#[error("send request: {0}")]
	Request(#[source] reqwest::Error),

	#[error("response code {0}")]
	Status(StatusCode),

	#[error("decode response: {0}")]
	Decode(#[source] reqwest::Error),
}

/// Client settings. Durations are whole seconds; zero disables the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
	pub dial_timeout_secs: u64,
	pub keep_alive_secs: u64,
	pub max_idle_per_host: usize,
	pub idle_timeout_secs: u64,
	pub request_timeout_secs: u64,
}

impl Default for HttpClientConfig {
	fn default() -> Self {
		Self {
			dial_timeout_secs: 10,
			keep_alive_secs: 30,
			max_idle_per_host: 32,
			idle_timeout_secs: 90,
			request_timeout_secs: 0,
		}
	}
}

impl HttpClientConfig {
	/// Schema over `<PREFIX>_HTTP_*`. Only the dial timeout is required; the
	/// rest keep the value already in the target.
	pub fn schema(prefix: &str) -> Schema<Self> {
		Schema::new()
			.required(format!("{prefix}_HTTP_DIAL_TIMEOUT"), |c: &mut Self, v| {
				c.dial_timeout_secs = v
			})
			.optional(format!("{prefix}_HTTP_KEEP_ALIVE"), |c: &mut Self, v| {
				c.keep_alive_secs = v
			})
			.optional(format!("{prefix}_HTTP_MAX_IDLE_PER_HOST"), |c: &mut Self, v| {
				c.max_idle_per_host = v
			})
			.optional(format!("{prefix}_HTTP_IDLE_TIMEOUT"), |c: &mut Self, v| {
				c.idle_timeout_secs = v
			})
			.optional(format!("{prefix}_HTTP_TIMEOUT"), |c: &mut Self, v| {
				c.request_timeout_secs = v
			})
	}
}

fn secs(n: u64) -> Option<Duration> {
	(n > 0).then(|| Duration::from_secs(n))
}

/// A pooled JSON-over-HTTP client.
#[derive(Debug)]
pub struct HttpClient {
	inner: reqwest::Client,
	closed: AtomicBool,
}

impl HttpClient {
	pub fn new(config: &HttpClientConfig) -> Result<Self, HttpError> {
		let mut builder = reqwest::Client::builder()
			.tcp_keepalive(secs(config.keep_alive_secs))
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(secs(config.idle_timeout_secs));
		if let Some(timeout) = secs(config.dial_timeout_secs) {
			builder = builder.connect_timeout(timeout);
		}
		if let Some(timeout) = secs(config.request_timeout_secs) {
			builder = builder.timeout(timeout);
		}

		Ok(Self {
			inner: builder.build().map_err(HttpError::Build)?,
			closed: AtomicBool::new(false),
		})
	}

	/// GETs `url` with `query` appended and decodes a `200 OK` JSON body.
	pub async fn get<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, HttpError>
	where
		T: DeserializeOwned,
	{
		let response = self
			.inner
			.get(url)
			.query(query)
			.send()
			.await
			.map_err(HttpError::Request)?;
		decode(response).await
	}

	/// POSTs `body` as JSON and decodes a `200 OK` JSON body.
	pub async fn post<B, T>(&self, url: &str, body: &B) -> Result<T, HttpError>
	where
		B: Serialize + ?Sized,
		T: DeserializeOwned,
	{
		let response = self
			.inner
			.post(url)
			.json(body)
			.send()
			.await
			.map_err(HttpError::Request)?;
		decode(response).await
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, HttpError> {
	let status = response.status();
	if status != StatusCode::OK {
		return Err(HttpError::Status(status));
	}
	response.json().await.map_err(HttpError::Decode)
}

/// Pooled connections are released when the last handle to the client drops.
impl Resource for HttpClient {
	type Error = Infallible;

	fn close(&self) -> Result<(), Infallible> {
		if !self.closed.swap(true, Ordering::SeqCst) {
			debug!("http client closed");
		}
		Ok(())
	}
}

/// Any difference replaces the client.
pub fn compare(old: &HttpClientConfig, new: &HttpClientConfig) -> Result<Decision, Infallible> {
	Ok(if old == new {
		Decision::NoNeed
	} else {
		Decision::NeedReplace
	})
}

pub fn construct(config: &HttpClientConfig) -> Result<HttpClient, HttpError> {
	HttpClient::new(config)
}

/// Builds an HTTP client container around `fetch`.
pub fn http_container<F, E>(
	name: impl Into<String>,
	fetch: F,
) -> Result<Container<HttpClient, HttpClientConfig>, HoldError>
where
	F: Fn() -> Result<HttpClientConfig, E> + Send + Sync + 'static,
	E: Into<BoxError>,
{
	Container::builder()
		.name(name)
		.fetch(fetch)
		.compare(compare)
		.construct(construct)
		.build()
}

impl Container<HttpClient, HttpClientConfig> {
	/// Checks out the current client for the duration of one GET.
	pub async fn get<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, HttpError>
	where
		T: DeserializeOwned,
	{
		let client = self.checkout();
		client.get(url, query).await
	}

	/// Checks out the current client for the duration of one POST.
	pub async fn post<B, T>(&self, url: &str, body: &B) -> Result<T, HttpError>
	where
		B: Serialize + ?Sized,
		T: DeserializeOwned,
	{
		let client = self.checkout();
		client.post(url, body).await
	}
}
