//! Inbound events decoded from poll and send responses.

use serde_json::Value;

use crate::error::ProtocolError;
use crate::types::{Header, header_str, header_u64};

/// An inbound protocol message with its payload re-encoded as JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
	pub header: Header,
	/// Zero or one JSON-encoded payload frames.
	pub payload: Vec<String>,
}

impl Event {
	/// Decodes one element of a response batch.
	///
	/// A `payload` field, if present, is serialized back to JSON text because
	/// event handlers consume frames rather than structured values.
	pub fn decode(value: Value) -> Result<Self, ProtocolError> {
		let header = match value {
			Value::Object(map) => map,
			other => return Err(ProtocolError::NotAnObject(other.to_string())),
		};

		let mut payload = Vec::new();
		if let Some(object) = header.get("payload") {
			payload.push(serde_json::to_string(object)?);
		}

		Ok(Self { header, payload })
	}

	/// The `event` field of the header.
	pub fn name(&self) -> Option<&str> {
		header_str(&self.header, "event")
	}

	/// The action id this event confirms, or 0.
	pub fn action_id(&self) -> u64 {
		header_u64(&self.header, "action_id")
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn payload_is_reencoded_as_json_text() {
		let event = Event::decode(json!({
			"event": "message_received",
			"action_id": 3,
			"payload": {"text": "hi"}
		}))
		.unwrap();

		assert_eq!(event.name(), Some("message_received"));
		assert_eq!(event.action_id(), 3);
		assert_eq!(event.payload, vec![r#"{"text":"hi"}"#.to_string()]);
	}

	#[test]
	fn missing_payload_yields_no_frames() {
		let event = Event::decode(json!({"event": "pong"})).unwrap();
		assert!(event.payload.is_empty());
		assert_eq!(event.action_id(), 0);
	}

	#[test]
	fn non_object_is_rejected() {
		assert!(matches!(Event::decode(json!([1, 2])), Err(ProtocolError::NotAnObject(_))));
	}
}
