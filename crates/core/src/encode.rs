//! Per-call wire form of a buffered action.
//!
//! The buffered header is never touched: every call starts from a copy and
//! adds `payload`, `session_id` or caller credentials to that copy only, so
//! a retried action is encoded from the same pristine header.

use ninchat_protocol::{Action, Credentials, Header, SessionId, parse_data_uri};
use serde_json::Value;

use crate::error::Result;

/// An action ready for one of the two request encodings.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
	/// Serialized header, small enough for the GET encoding.
	Jsonp(String),
	/// Sessionless header for the POST encoding, carrying caller credentials.
	Post(Header),
}

/// Chooses the encoding by serialized size: up to `max_jsonp_size` bytes
/// inclusive goes over GET, anything larger over POST.
pub fn encode_action(action: &Action, session_id: Option<&SessionId>, credentials: &Credentials, max_jsonp_size: usize) -> Result<Outbound> {
	let mut header = action.header.clone();
	if let Some(frame) = &action.payload {
		header.insert("payload".into(), encode_payload(action, frame)?);
	}

	if let Some(session_id) = session_id {
		header.insert("session_id".into(), session_id.clone().into());
	}
	let json = serde_json::to_string(&header)?;
	if json.len() <= max_jsonp_size {
		return Ok(Outbound::Jsonp(json));
	}

	header.remove("session_id");
	if let Some(user_id) = &credentials.user_id {
		header.insert("caller_id".into(), Value::from(user_id.as_str()));
	}
	if let Some(user_auth) = &credentials.user_auth {
		header.insert("caller_auth".into(), Value::from(user_auth.as_str()));
	}
	Ok(Outbound::Post(header))
}

/// Attachments travel as `[base64]`; every other frame is JSON text.
fn encode_payload(action: &Action, frame: &str) -> Result<Value> {
	if action.carries_attachment() {
		let data = parse_data_uri(frame)?;
		return Ok(Value::Array(vec![Value::String(data)]));
	}
	Ok(serde_json::from_str(frame)?)
}
