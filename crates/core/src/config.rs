//! Transport timeouts, jitter factors and endpoint layout.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// Tunables for one [`LongPollTransport`](crate::LongPollTransport).
///
/// Every timeout is jittered independently before use. Setting both jitter
/// factors to 0 makes all deadlines exact, which tests rely on.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
	/// Deadline for the `create_session` round-trip.
	#[serde(rename = "session_create_timeout_ms", deserialize_with = "duration_ms")]
	pub session_create_timeout: Duration,
	/// Deadline for a poll request; the server holds polls open until events arrive.
	#[serde(rename = "poll_timeout_ms", deserialize_with = "duration_ms")]
	pub poll_timeout: Duration,
	/// Deadline for a send request, and the base for ping/close.
	#[serde(rename = "send_timeout_ms", deserialize_with = "duration_ms")]
	pub send_timeout: Duration,
	/// Jitter factor for session creation, polls and sends.
	pub jitter: f64,
	/// Jitter factor for the ping and close probes.
	pub probe_jitter: f64,
	/// Largest serialized send that still uses the GET encoding, in bytes.
	pub max_jsonp_size: usize,
	pub scheme: String,
	pub poll_path: String,
	pub call_path: String,
}

impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			session_create_timeout: Duration::from_secs(13),
			poll_timeout: Duration::from_secs(64),
			send_timeout: Duration::from_secs(7),
			jitter: 0.2,
			probe_jitter: 0.9,
			max_jsonp_size: 2048,
			scheme: "https".into(),
			poll_path: "/v2/poll".into(),
			call_path: "/v2/call".into(),
		}
	}
}

impl TransportConfig {
	/// Parses a JSON config; absent fields keep their defaults.
	pub fn from_json_str(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Rejects zero timeouts and negative or non-finite jitter factors.
	pub fn validate(&self) -> Result<()> {
		for (name, value) in [
			("session_create_timeout", self.session_create_timeout),
			("poll_timeout", self.poll_timeout),
			("send_timeout", self.send_timeout),
		] {
			if value.is_zero() {
				return Err(Error::Config(format!("{name} must be positive")));
			}
		}

		for (name, value) in [("jitter", self.jitter), ("probe_jitter", self.probe_jitter)] {
			if !value.is_finite() || value < 0.0 {
				return Err(Error::Config(format!("{name} must be a non-negative number, got {value}")));
			}
		}

		if self.max_jsonp_size == 0 {
			return Err(Error::Config("max_jsonp_size must be positive".into()));
		}

		Ok(())
	}

	/// Endpoint for polls and size-limited sends on the discovered host.
	pub fn poll_url(&self, host: &str) -> String {
		format!("{}://{}{}", self.scheme, host, self.poll_path)
	}

	/// Endpoint for oversized sends on the API address.
	pub fn call_url(&self, address: &str) -> String {
		format!("{}://{}{}", self.scheme, address, self.call_path)
	}

	pub fn with_session_create_timeout(mut self, timeout: Duration) -> Self {
		self.session_create_timeout = timeout;
		self
	}

	pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
		self.poll_timeout = timeout;
		self
	}

	pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
		self.send_timeout = timeout;
		self
	}

	/// Sets both jitter factors.
	pub fn with_jitter(mut self, jitter: f64, probe_jitter: f64) -> Self {
		self.jitter = jitter;
		self.probe_jitter = probe_jitter;
		self
	}

	pub fn with_max_jsonp_size(mut self, size: usize) -> Self {
		self.max_jsonp_size = size;
		self
	}

	pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
		self.scheme = scheme.into();
		self
	}
}

/// Stretches `duration` by a random share of up to `factor`.
///
/// The result lies in `[duration, duration * (1 + factor))`. Factors that are
/// not positive, NaN included, leave `duration` as is; results too large for a
/// [`Duration`] saturate.
pub fn jitter(duration: Duration, factor: f64) -> Duration {
	if factor.is_nan() || factor <= 0.0 {
		return duration;
	}
	let scale = 1.0 + rand::random::<f64>() * factor;
	Duration::try_from_secs_f64(duration.as_secs_f64() * scale).unwrap_or(Duration::MAX)
}

fn duration_ms<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
	D: Deserializer<'de>,
{
	u64::deserialize(deserializer).map(Duration::from_millis)
}
