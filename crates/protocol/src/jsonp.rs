//! JSONP envelope handling for the size-limited GET encoding.

use serde_json::Value;

use crate::error::ProtocolError;

/// Strips a `callback(...)` envelope and parses the JSON inside.
///
/// Bodies that are plain JSON are accepted too, so servers that answer the
/// GET encoding without a wrapper still work.
pub fn unwrap_jsonp(body: &str, callback: &str) -> Result<Value, ProtocolError> {
	let body = body.trim();
	let Some(rest) = body.strip_prefix(callback) else {
		return Ok(serde_json::from_str(body)?);
	};

	let inner = rest
		.trim_start()
		.strip_prefix('(')
		.and_then(|s| s.trim_end().trim_end_matches(';').trim_end().strip_suffix(')'))
		.ok_or_else(|| ProtocolError::Jsonp(format!("malformed {callback}(...) envelope")))?;

	Ok(serde_json::from_str(inner)?)
}

/// Normalizes a decoded response into a batch of event headers.
///
/// Arrays are batches already; a lone object is a batch of one; `null` is an
/// empty batch.
pub fn into_batch(value: Value) -> Result<Vec<Value>, ProtocolError> {
	match value {
		Value::Array(items) => Ok(items),
		Value::Object(_) => Ok(vec![value]),
		Value::Null => Ok(Vec::new()),
		other => Err(ProtocolError::NotAnObject(other.to_string())),
	}
}
