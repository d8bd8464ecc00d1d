//! [`reqwest`]-backed [`RequestIssuer`].

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ninchat_protocol::{Header, into_batch, unwrap_jsonp};
use serde_json::Value;
use tracing::debug;

use super::{Batch, RequestIssuer, ResponseChannel};
use crate::error::{Error, Result};

/// Issues requests over HTTPS, answering each channel from a spawned task.
///
/// Network failures, error statuses and undecodable bodies all resolve the
/// channel as a timeout; from the transport's point of view the server simply
/// did not answer in time.
#[derive(Debug, Clone)]
pub struct HttpIssuer {
	client: reqwest::Client,
	next_callback: Arc<AtomicU64>,
}

impl HttpIssuer {
	/// Creates an issuer with a default rustls-backed client.
	pub fn new() -> Result<Self> {
		let client = reqwest::Client::builder().build()?;
		Ok(Self::with_client(client))
	}

	/// Reuses an existing client (connection pool, proxy settings).
	pub fn with_client(client: reqwest::Client) -> Self {
		Self {
			client,
			next_callback: Arc::new(AtomicU64::new(1)),
		}
	}

	fn callback_name(&self) -> String {
		format!("__ninchat{}", self.next_callback.fetch_add(1, Ordering::Relaxed))
	}

	fn spawn<F>(&self, kind: &'static str, timeout: Duration, request: F) -> Result<ResponseChannel>
	where
		F: Future<Output = Result<Batch>> + Send + 'static,
	{
		let runtime = tokio::runtime::Handle::try_current().map_err(|e| Error::Unavailable(e.to_string()))?;
		let (responder, channel) = ResponseChannel::pair();

		runtime.spawn(async move {
			let outcome = match tokio::time::timeout(timeout, request).await {
				Ok(Ok(batch)) => Some(batch),
				Ok(Err(err)) => {
					debug!(target = "ninchat.longpoll", kind, error = %err, "request failed");
					None
				}
				Err(_) => None,
			};
			responder.finish(outcome);
		});

		Ok(channel)
	}
}

impl RequestIssuer for HttpIssuer {
	fn jsonp(&self, url: &str, data: String, timeout: Duration) -> Result<ResponseChannel> {
		let callback = self.callback_name();
		let request = self.client.get(url).query(&[("callback", callback.as_str()), ("data", data.as_str())]);

		self.spawn("jsonp", timeout, async move {
			let response = request.send().await?;
			if !response.status().is_success() {
				return Err(Error::Status(response.status().as_u16()));
			}
			let body = response.text().await?;
			Ok(into_batch(unwrap_jsonp(&body, &callback)?)?)
		})
	}

	fn post(&self, url: &str, header: Header, timeout: Duration) -> Result<ResponseChannel> {
		let request = self.client.post(url).json(&header);

		self.spawn("post", timeout, async move {
			let response = request.send().await?;
			if !response.status().is_success() {
				return Err(Error::Status(response.status().as_u16()));
			}
			let value: Value = response.json().await?;
			Ok(into_batch(value)?)
		})
	}
}
