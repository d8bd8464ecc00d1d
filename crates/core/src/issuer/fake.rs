//! In-memory issuer for exercising the transport without a server.
//!
//! # Example
//!
//! ```ignore
//! let (issuer, mut controller) = FakeIssuer::new();
//! let transport = LongPollTransport::new(issuer, config)?;
//!
//! tokio::spawn(async move { transport.run(&mut host, "api.example.com").await });
//!
//! let poll = controller.next_request().await.unwrap();
//! poll.respond(vec![json!({"event": "pong"})]);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ninchat_protocol::{Header, header_str};
use tokio::sync::mpsc;

use super::{Batch, RequestIssuer, Responder, ResponseChannel};
use crate::error::{Error, Result};

/// Which encoding a request was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
	Jsonp,
	Post,
}

/// A request captured by [`FakeIssuer`], answerable by the test.
///
/// Dropping it unanswered resolves the transport's channel as a timeout.
#[derive(Debug)]
pub struct IssuedRequest {
	pub kind: RequestKind,
	pub url: String,
	pub header: Header,
	/// Serialized JSONP data, exactly as the transport produced it.
	pub data: Option<String>,
	pub timeout: Duration,
	responder: Responder,
}

impl IssuedRequest {
	/// The `action` field of the request header.
	pub fn action(&self) -> Option<&str> {
		header_str(&self.header, "action")
	}

	pub fn respond(self, batch: Batch) {
		self.responder.respond(batch);
	}

	pub fn time_out(self) {
		self.responder.time_out();
	}
}

/// Issuer half handed to the transport.
#[derive(Debug, Clone)]
pub struct FakeIssuer {
	issued: mpsc::UnboundedSender<IssuedRequest>,
	failing: Arc<AtomicBool>,
}

impl FakeIssuer {
	/// Builds the issuer and the controller that observes it.
	pub fn new() -> (FakeIssuer, FakeIssuerController) {
		let (issued, requests) = mpsc::unbounded_channel();
		let failing = Arc::new(AtomicBool::new(false));

		let issuer = FakeIssuer {
			issued,
			failing: Arc::clone(&failing),
		};
		(issuer, FakeIssuerController { requests, failing })
	}

	fn capture(&self, kind: RequestKind, url: &str, header: Header, data: Option<String>, timeout: Duration) -> Result<ResponseChannel> {
		if self.failing.load(Ordering::SeqCst) {
			return Err(Error::Unavailable("fake issuer set to fail".into()));
		}

		let (responder, channel) = ResponseChannel::pair();
		let request = IssuedRequest {
			kind,
			url: url.to_string(),
			header,
			data,
			timeout,
			responder,
		};
		// A dropped controller leaves the request unanswered, i.e. timed out.
		let _ = self.issued.send(request);
		Ok(channel)
	}
}

impl RequestIssuer for FakeIssuer {
	fn jsonp(&self, url: &str, data: String, timeout: Duration) -> Result<ResponseChannel> {
		let header: Header = serde_json::from_str(&data)?;
		self.capture(RequestKind::Jsonp, url, header, Some(data), timeout)
	}

	fn post(&self, url: &str, header: Header, timeout: Duration) -> Result<ResponseChannel> {
		self.capture(RequestKind::Post, url, header, None, timeout)
	}
}

/// Test-side handle: receives issued requests and injects failures.
#[derive(Debug)]
pub struct FakeIssuerController {
	requests: mpsc::UnboundedReceiver<IssuedRequest>,
	failing: Arc<AtomicBool>,
}

impl FakeIssuerController {
	/// Waits for the next issued request; `None` once the issuer is gone.
	pub async fn next_request(&mut self) -> Option<IssuedRequest> {
		self.requests.recv().await
	}

	/// Returns an already-issued request without waiting.
	pub fn try_next_request(&mut self) -> Option<IssuedRequest> {
		self.requests.try_recv().ok()
	}

	/// Makes every following request fail to start.
	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}
}
