//! Identifiers and header maps shared by actions and events.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A protocol header: the JSON object carrying one action or event.
pub type Header = Map<String, Value>;

/// Opaque session identifier assigned by the server on session creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
	/// Wraps a server-provided identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for SessionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<SessionId> for Value {
	fn from(id: SessionId) -> Self {
		Value::String(id.0)
	}
}

/// Caller identity attached to oversized sends, which bypass the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
	pub user_id: Option<String>,
	pub user_auth: Option<String>,
}

impl Credentials {
	pub fn new(user_id: impl Into<String>, user_auth: impl Into<String>) -> Self {
		Self {
			user_id: Some(user_id.into()),
			user_auth: Some(user_auth.into()),
		}
	}
}

/// Reads an unsigned integer field, treating absent or malformed values as 0.
pub fn header_u64(header: &Header, key: &str) -> u64 {
	header.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Reads a string field.
pub fn header_str<'a>(header: &'a Header, key: &str) -> Option<&'a str> {
	header.get(key).and_then(Value::as_str)
}
