//! Errors raised while encoding or decoding wire data.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
	#[error("invalid data URI: {0}")]
	DataUri(String),

	#[error("invalid base64 data: {0}")]
	Base64(#[from] base64::DecodeError),

	#[error("invalid JSONP response: {0}")]
	Jsonp(String),

	#[error("event is not a JSON object: {0}")]
	NotAnObject(String),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}
