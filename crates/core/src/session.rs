//! What the transport needs from the session that owns it.
//!
//! The session object itself (event dispatch, session-parameter handling,
//! callbacks towards the application) lives outside this crate. The
//! transport only drives it through [`SessionHost`].

use ninchat_protocol::{Credentials, Header, SessionId};
use tokio::sync::mpsc;

use crate::buffer::SendBuffer;

/// Result of handing one inbound event to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventOutcome {
	/// Action id confirmed by the event, or 0.
	pub acked_action_id: u64,
	/// `false` ends the transport run: the event violated the protocol.
	pub ok: bool,
}

impl EventOutcome {
	pub fn accepted(acked_action_id: u64) -> Self {
		Self { acked_action_id, ok: true }
	}

	pub fn rejected() -> Self {
		Self {
			acked_action_id: 0,
			ok: false,
		}
	}
}

/// Connectivity summary of one transport run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportOutcome {
	/// Whether the request mechanism itself worked, regardless of protocol success.
	pub conn_worked: bool,
	/// Whether the session was connected at any point during the run.
	pub got_online: bool,
}

/// Session state and callbacks consumed by [`LongPollTransport`](crate::LongPollTransport).
pub trait SessionHost: Send {
	/// Current session, `None` until the first `session_created` event.
	fn session_id(&self) -> Option<SessionId>;

	/// API address used for oversized sends.
	fn address(&self) -> &str;

	/// Caller identity attached to oversized sends.
	fn caller_credentials(&self) -> Credentials;

	/// The outbound buffer drained by the transport.
	fn send_buffer(&self) -> &SendBuffer;

	/// Control signals from the application.
	fn signals(&mut self) -> &mut SessionSignals;

	fn create_session_header(&self) -> Header;

	/// Header for each poll; it resumes the session and acknowledges seen events.
	fn resume_session_header(&self) -> Header;

	/// Connectivity state became "connected".
	fn connected(&mut self);

	/// A response arrived, so the network path is alive.
	fn conn_active(&mut self);

	/// Handles the answer to `create_session`; `false` aborts the run.
	fn handle_session_event(&mut self, header: Header) -> bool;

	/// Handles one inbound event with its JSON-encoded payload frames.
	///
	/// Hosts are expected to drop confirmed actions from the send buffer,
	/// typically with [`SendBuffer::acknowledge`]. The transport reads only the
	/// acknowledged id and the verdict; anything else the session derives from
	/// the event stays with the host.
	fn handle_event(&mut self, header: Header, payload: Vec<String>) -> EventOutcome;
}

/// A control signal observed by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
	/// Sending was switched on or off; off closes the session.
	Sending(bool),
	Close,
}

/// Receiving side of the application's control signals.
#[derive(Debug)]
pub struct SessionSignals {
	sending: mpsc::UnboundedReceiver<bool>,
	close: mpsc::UnboundedReceiver<()>,
	sending_open: bool,
}

/// Application side of [`SessionSignals`].
#[derive(Debug, Clone)]
pub struct SignalSender {
	sending: mpsc::UnboundedSender<bool>,
	close: mpsc::UnboundedSender<()>,
}

impl SessionSignals {
	pub fn channel() -> (SignalSender, SessionSignals) {
		let (sending_tx, sending) = mpsc::unbounded_channel();
		let (close_tx, close) = mpsc::unbounded_channel();
		(
			SignalSender {
				sending: sending_tx,
				close: close_tx,
			},
			SessionSignals {
				sending,
				close,
				sending_open: true,
			},
		)
	}

	/// Waits for the next signal of either kind.
	///
	/// Once every [`SignalSender`] is dropped this reports [`Signal::Close`].
	pub async fn next(&mut self) -> Signal {
		loop {
			tokio::select! {
				sending = self.sending.recv(), if self.sending_open => match sending {
					Some(sending) => return Signal::Sending(sending),
					None => self.sending_open = false,
				},
				_ = self.close.recv() => return Signal::Close,
			}
		}
	}

	/// Resolves on a close request, or when the application side is dropped.
	pub async fn closed(&mut self) {
		let _ = self.close.recv().await;
	}
}

impl SignalSender {
	/// `false` asks the transport to close the session after the current wait.
	pub fn set_sending(&self, sending: bool) {
		let _ = self.sending.send(sending);
	}

	pub fn close(&self) {
		let _ = self.close.send(());
	}
}
