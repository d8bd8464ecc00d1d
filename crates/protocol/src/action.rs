//! Outbound actions and the transport's own protocol actions.

use serde_json::{Value, json};

use crate::types::{Header, SessionId, header_str};

/// Action name whose payload frame is a data URI rather than JSON text.
pub const UPDATE_USER: &str = "update_user";

/// An outbound protocol message waiting in the send buffer.
///
/// `id == 0` marks a fire-and-forget action; anything else is retired only
/// once the server confirms it.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
	pub id: u64,
	pub header: Header,
	/// Single payload frame: JSON text, or a data URI for attachments.
	pub payload: Option<String>,
}

impl Action {
	/// Creates a fire-and-forget action from a header.
	pub fn new(header: Header) -> Self {
		Self { id: 0, header, payload: None }
	}

	/// Assigns an acknowledgment id, mirrored into the `action_id` field.
	pub fn with_id(mut self, id: u64) -> Self {
		self.id = id;
		if id > 0 {
			self.header.insert("action_id".into(), Value::from(id));
		} else {
			self.header.remove("action_id");
		}
		self
	}

	pub fn with_payload(mut self, frame: impl Into<String>) -> Self {
		self.payload = Some(frame.into());
		self
	}

	/// The `action` field of the header.
	pub fn name(&self) -> Option<&str> {
		header_str(&self.header, "action")
	}

	/// Whether the payload frame is a data-URI encoded user attachment.
	pub fn carries_attachment(&self) -> bool {
		self.name() == Some(UPDATE_USER)
	}
}

fn object(value: Value) -> Header {
	match value {
		Value::Object(map) => map,
		_ => Header::new(),
	}
}

/// Builds a `create_session` header from the caller's session parameters.
pub fn create_session(params: &Header) -> Header {
	let mut header = params.clone();
	header.insert("action".into(), Value::from("create_session"));
	header
}

/// Builds a `resume_session` header, optionally acknowledging events up to `event_id`.
pub fn resume_session(session_id: &SessionId, event_id: Option<u64>) -> Header {
	let mut header = object(json!({
		"action": "resume_session",
		"session_id": session_id,
	}));
	if let Some(event_id) = event_id {
		header.insert("event_id".into(), Value::from(event_id));
	}
	header
}

/// Builds a `ping` header. Pings carry no `action_id`.
pub fn ping(session_id: &SessionId) -> Header {
	object(json!({
		"action": "ping",
		"session_id": session_id,
	}))
}

/// Builds a `close_session` header. The response is never awaited.
///
/// A close requested while the session is still being created has no id
/// to name; the header then goes out without one.
pub fn close_session(session_id: Option<&SessionId>) -> Header {
	let mut header = object(json!({"action": "close_session"}));
	if let Some(session_id) = session_id {
		header.insert("session_id".into(), Value::from(session_id.clone()));
	}
	header
}
