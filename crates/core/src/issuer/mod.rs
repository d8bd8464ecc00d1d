//! Timed request issuing: the only way the transport talks to the network.
//!
//! An issuer starts a request and immediately hands back a
//! [`ResponseChannel`]. The channel yields exactly one value: the decoded
//! response batch, or `None` when the deadline passed without an answer.
//! Failing to *start* a request is the only error an issuer reports.

mod fake;
mod http;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use ninchat_protocol::Header;
use serde_json::Value;
use tokio::sync::oneshot;

pub use fake::{FakeIssuer, FakeIssuerController, IssuedRequest, RequestKind};
pub use http::HttpIssuer;

use crate::error::Result;

/// Decoded response elements, one JSON object per event.
pub type Batch = Vec<Value>;

/// Starts timed requests on behalf of the transport.
pub trait RequestIssuer: Send + Sync {
	/// Size-limited GET encoding; `data` is the serialized header.
	fn jsonp(&self, url: &str, data: String, timeout: Duration) -> Result<ResponseChannel>;

	/// Unbounded POST encoding; `header` must already carry caller credentials.
	fn post(&self, url: &str, header: Header, timeout: Duration) -> Result<ResponseChannel>;
}

/// Producer half of a [`ResponseChannel`].
///
/// Dropping it without answering resolves the channel as a timeout.
#[derive(Debug)]
pub struct Responder {
	tx: oneshot::Sender<Option<Batch>>,
}

impl Responder {
	pub fn respond(self, batch: Batch) {
		self.finish(Some(batch));
	}

	pub fn time_out(self) {
		self.finish(None);
	}

	pub(crate) fn finish(self, outcome: Option<Batch>) {
		// The transport abandons channels it no longer waits on.
		let _ = self.tx.send(outcome);
	}
}

/// Single-use response future for one issued request.
#[derive(Debug)]
pub struct ResponseChannel {
	rx: oneshot::Receiver<Option<Batch>>,
}

impl ResponseChannel {
	/// Creates a connected responder/channel pair.
	pub fn pair() -> (Responder, ResponseChannel) {
		let (tx, rx) = oneshot::channel();
		(Responder { tx }, ResponseChannel { rx })
	}
}

impl Future for ResponseChannel {
	type Output = Option<Batch>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.rx).poll(cx).map(|outcome| outcome.unwrap_or(None))
	}
}
