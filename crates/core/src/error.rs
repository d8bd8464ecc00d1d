//! Error types for the long-poll transport.
//!
//! Timeouts are deliberately absent: a request that gets no answer in time
//! resolves to `None` on its [`ResponseChannel`](crate::ResponseChannel)
//! and is counted by the transfer loop, not raised.

use ninchat_protocol::ProtocolError;
use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// The HTTP client could not be built or a request could not be prepared.
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// A header could not be serialized.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// Wire data (payload frame, data URI, JSONP body) was malformed.
	#[error("protocol error: {0}")]
	Protocol(#[from] ProtocolError),

	/// The server answered with a non-success status.
	#[error("unexpected HTTP status {0}")]
	Status(u16),

	/// The request mechanism cannot issue requests at all.
	#[error("request issuer unavailable: {0}")]
	Unavailable(String),

	/// Invalid transport configuration.
	#[error("configuration error: {0}")]
	Config(String),
}
