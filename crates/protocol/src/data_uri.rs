//! Data-URI handling for user attachment payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ProtocolError;

/// Extracts the base64 body of a `data:<mime>;base64,<data>` URI.
///
/// The body is checked to be valid base64 and returned as-is, since the API
/// expects the attachment in its base64 form.
pub fn parse_data_uri(uri: &str) -> Result<String, ProtocolError> {
	let rest = uri
		.strip_prefix("data:")
		.ok_or_else(|| ProtocolError::DataUri("missing data: scheme".into()))?;
	let (meta, data) = rest.split_once(',').ok_or_else(|| ProtocolError::DataUri("missing comma".into()))?;

	if !meta.split(';').any(|part| part == "base64") {
		return Err(ProtocolError::DataUri("only base64 encoding is supported".into()));
	}

	STANDARD.decode(data)?;
	Ok(data.to_string())
}
