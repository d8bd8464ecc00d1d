//! Shared session host and helpers for transport tests.

#![allow(dead_code)]

use std::time::Duration;

use ninchat::protocol::{Action, Credentials, Header, SessionId, create_session, header_str, header_u64, resume_session};
use ninchat::{EventOutcome, FakeIssuer, FakeIssuerController, IssuedRequest, LongPollTransport, SendBuffer, SessionHost, SessionSignals, SignalSender, TransportConfig, TransportOutcome};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

pub const POLL_HOST: &str = "poll.test";
pub const API_ADDRESS: &str = "api.test";

/// In-memory session that records every callback the transport makes.
pub struct TestHost {
	pub session_id: Option<SessionId>,
	pub buffer: SendBuffer,
	pub signals: SessionSignals,
	/// Drop confirmed actions from the buffer, like a real session does.
	pub remove_acked: bool,
	pub accept_session: bool,
	pub reject_events: bool,
	pub connected: usize,
	pub active: usize,
	pub events: Vec<(Header, Vec<String>)>,
}

impl TestHost {
	pub fn new(session_id: Option<&str>) -> (Self, SignalSender) {
		let (sender, signals) = SessionSignals::channel();
		let host = Self {
			session_id: session_id.map(SessionId::new),
			buffer: SendBuffer::new(),
			signals,
			remove_acked: true,
			accept_session: true,
			reject_events: false,
			connected: 0,
			active: 0,
			events: Vec::new(),
		};
		(host, sender)
	}
}

impl SessionHost for TestHost {
	fn session_id(&self) -> Option<SessionId> {
		self.session_id.clone()
	}

	fn address(&self) -> &str {
		API_ADDRESS
	}

	fn caller_credentials(&self) -> Credentials {
		Credentials::new("user-1", "auth-1")
	}

	fn send_buffer(&self) -> &SendBuffer {
		&self.buffer
	}

	fn signals(&mut self) -> &mut SessionSignals {
		&mut self.signals
	}

	fn create_session_header(&self) -> Header {
		create_session(&header(json!({"user_id": "user-1", "user_auth": "auth-1"})))
	}

	fn resume_session_header(&self) -> Header {
		self.session_id.as_ref().map(|id| resume_session(id, None)).unwrap_or_default()
	}

	fn connected(&mut self) {
		self.connected += 1;
	}

	fn conn_active(&mut self) {
		self.active += 1;
	}

	fn handle_session_event(&mut self, header: Header) -> bool {
		if !self.accept_session || header_str(&header, "event") != Some("session_created") {
			return false;
		}
		self.session_id = header_str(&header, "session_id").map(SessionId::new);
		true
	}

	fn handle_event(&mut self, header: Header, payload: Vec<String>) -> EventOutcome {
		let acked = header_u64(&header, "action_id");
		self.events.push((header, payload));

		if self.reject_events {
			return EventOutcome::rejected();
		}
		if self.remove_acked {
			self.buffer.acknowledge(acked);
		}
		EventOutcome::accepted(acked)
	}
}

pub fn header(value: Value) -> Header {
	value.as_object().cloned().expect("header must be a JSON object")
}

pub fn message(id: u64, text: &str) -> Action {
	Action::new(header(json!({"action": "send_message", "channel_id": "c1"})))
		.with_id(id)
		.with_payload(json!({"text": text}).to_string())
}

pub fn typing() -> Action {
	Action::new(header(json!({"action": "update_session", "typing": true})))
}

pub fn ack_event(action_id: u64) -> Value {
	json!({"event": "message_received", "action_id": action_id, "payload": {"text": "ok"}})
}

/// Deterministic config: no jitter, protocol default timeouts.
pub fn config() -> TransportConfig {
	TransportConfig::default().with_jitter(0.0, 0.0)
}

pub fn start(host: TestHost) -> (JoinHandle<(TestHost, TransportOutcome)>, FakeIssuerController) {
	let (issuer, controller) = FakeIssuer::new();
	let transport = LongPollTransport::new(issuer, config()).expect("test config is valid");
	(spawn_run(transport, host), controller)
}

pub fn spawn_run(transport: LongPollTransport<FakeIssuer>, mut host: TestHost) -> JoinHandle<(TestHost, TransportOutcome)> {
	tokio::spawn(async move {
		let outcome = transport.run(&mut host, POLL_HOST).await;
		(host, outcome)
	})
}

/// Next issued request, failing the test instead of hanging.
pub async fn next(controller: &mut FakeIssuerController) -> IssuedRequest {
	tokio::time::timeout(Duration::from_secs(1), controller.next_request())
		.await
		.expect("transport should issue a request")
		.expect("issuer should still be alive")
}

/// Lets the transport task run until it blocks again.
pub async fn settle() {
	tokio::time::sleep(Duration::from_millis(10)).await;
}

pub async fn finish(handle: JoinHandle<(TestHost, TransportOutcome)>) -> (TestHost, TransportOutcome) {
	tokio::time::timeout(Duration::from_secs(1), handle)
		.await
		.expect("transport run should end")
		.expect("transport task should not panic")
}
