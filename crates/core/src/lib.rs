//! Long-poll fallback transport for the Ninchat real-time API.
//!
//! When no persistent socket is available, [`LongPollTransport`] keeps a
//! session alive with repeated HTTP round-trips: a long-running poll request
//! receives events while short send requests drain the session's outbound
//! buffer. Liveness is judged purely from timeouts; two in a row end a run.
//!
//! The session itself is supplied by the caller through [`SessionHost`], and
//! all network access goes through a [`RequestIssuer`]: [`HttpIssuer`] for
//! real servers, [`FakeIssuer`] for tests.

pub mod buffer;
pub mod config;
pub mod encode;
pub mod error;
pub mod issuer;
pub mod session;
pub mod transport;

pub use buffer::SendBuffer;
pub use config::{TransportConfig, jitter};
pub use encode::{Outbound, encode_action};
pub use error::{Error, Result};
pub use issuer::{Batch, FakeIssuer, FakeIssuerController, HttpIssuer, IssuedRequest, RequestIssuer, RequestKind, Responder, ResponseChannel};
pub use ninchat_protocol as protocol;
pub use session::{EventOutcome, SessionHost, SessionSignals, Signal, SignalSender, TransportOutcome};
pub use transport::{LongPollTransport, MAX_CONSECUTIVE_TIMEOUTS};
