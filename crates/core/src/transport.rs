//! Long-poll session lifecycle: bootstrap or resume, then the poll/send loop.
//!
//! # Flow
//!
//! 1. Without a session id, `create_session` is issued and its answer handed
//!    to the host; with one, a `ping` is fired so the first poll returns fast.
//! 2. The transfer loop keeps one poll in flight at all times and at most one
//!    send, and waits on whichever of poll, send or control signal finishes
//!    first.
//! 3. Two timeouts in a row, of either request kind, end the run. So does a
//!    close signal or an event the host rejects.
//!
//! Sends are at-least-once: after any timeout the buffer is replayed from its
//! front, because a send that timed out may still have reached the server.

use ninchat_protocol::{Action, Event, Header, SessionId, close_session, ping};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{TransportConfig, jitter};
use crate::encode::{Outbound, encode_action};
use crate::error::Result;
use crate::issuer::{Batch, RequestIssuer, ResponseChannel};
use crate::session::{SessionHost, Signal, TransportOutcome};

/// Consecutive timeouts after which the transport gives up.
pub const MAX_CONSECUTIVE_TIMEOUTS: u32 = 2;

/// Whichever source finished first in one loop iteration.
enum Resolved {
	Poll(Option<Batch>),
	Send(Option<Batch>),
	Signal(Signal),
}

/// Long-poll fallback transport driving one session through a [`RequestIssuer`].
///
/// The transport keeps no state between runs; everything that must survive a
/// run (session id, send buffer) belongs to the [`SessionHost`].
#[derive(Debug)]
pub struct LongPollTransport<I> {
	issuer: I,
	config: TransportConfig,
}

impl<I: RequestIssuer> LongPollTransport<I> {
	/// Fails with [`Error::Config`](crate::Error::Config) when `config` does not validate.
	pub fn new(issuer: I, config: TransportConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { issuer, config })
	}

	pub fn config(&self) -> &TransportConfig {
		&self.config
	}

	/// Creates or resumes the host's session on `host_name` and transfers
	/// actions and events until the connection is deemed lost or closed.
	///
	/// `conn_worked` is always set: reaching this point means endpoint
	/// discovery already talked to the server.
	pub async fn run<H: SessionHost>(&self, host: &mut H, host_name: &str) -> TransportOutcome {
		let mut outcome = TransportOutcome {
			conn_worked: true,
			got_online: false,
		};
		let url = self.config.poll_url(host_name);

		match host.session_id() {
			None => {
				info!(target = "ninchat.longpoll", host = host_name, "session creation");
				if !self.create_session(host, &url).await {
					return outcome;
				}
				outcome.got_online = true;
				host.connected();
				host.conn_active();
			}
			Some(session_id) => {
				info!(target = "ninchat.longpoll", host = host_name, session_id = %session_id, "session resumption");
				if let Err(err) = self.ping(&session_id, &url) {
					warn!(target = "ninchat.longpoll", error = %err, "session resumption failed");
					return outcome;
				}
			}
		}

		outcome.got_online = self.transfer(host, &url, outcome.got_online).await;
		outcome
	}

	/// Fires a `ping` without waiting for its answer.
	///
	/// Any resulting event arrives through the next poll; only a failure to
	/// issue the request is reported.
	pub fn ping(&self, session_id: &SessionId, url: &str) -> Result<()> {
		let timeout = jitter(self.config.send_timeout, self.config.probe_jitter);
		self.issue_jsonp(url, &ping(session_id), timeout).map(drop)
	}

	/// Announces session termination. Best effort: failures are only logged.
	pub fn close(&self, session_id: Option<&SessionId>, url: &str) {
		let timeout = jitter(self.config.send_timeout, self.config.probe_jitter);
		if let Err(err) = self.issue_jsonp(url, &close_session(session_id), timeout) {
			warn!(target = "ninchat.longpoll", error = %err, "close_session failed");
		}
	}

	/// Returns `true` once the host accepted the `create_session` answer.
	async fn create_session<H: SessionHost>(&self, host: &mut H, url: &str) -> bool {
		let header = host.create_session_header();
		let timeout = jitter(self.config.session_create_timeout, self.config.jitter);

		let response = match self.issue_jsonp(url, &header, timeout) {
			Ok(response) => response,
			Err(err) => {
				warn!(target = "ninchat.longpoll", error = %err, "session creation failed");
				return false;
			}
		};

		tokio::select! {
			batch = response => {
				let Some(batch) = batch else {
					info!(target = "ninchat.longpoll", "session creation timeout");
					return false;
				};
				match batch.into_iter().next() {
					Some(Value::Object(header)) => host.handle_session_event(header),
					_ => {
						warn!(target = "ninchat.longpoll", "session creation answered without an event");
						false
					}
				}
			}
			() = host.signals().closed() => {
				self.close(host.session_id().as_ref(), url);
				false
			}
		}
	}

	/// Runs the poll/send loop; returns whether the session is or was connected.
	///
	/// `connected` is reported to the host only if it was not already.
	async fn transfer<H: SessionHost>(&self, host: &mut H, url: &str, mut got_online: bool) -> bool {
		let mut poller: Option<ResponseChannel> = None;
		let mut sender: Option<ResponseChannel> = None;
		let mut sending_id = 0u64;
		let mut timeouts = 0u32;

		host.send_buffer().reset_sent();

		while timeouts < MAX_CONSECUTIVE_TIMEOUTS {
			if poller.is_none() {
				let header = host.resume_session_header();
				let timeout = jitter(self.config.poll_timeout, self.config.jitter);
				match self.issue_jsonp(url, &header, timeout) {
					Ok(channel) => poller = Some(channel),
					Err(err) => {
						warn!(target = "ninchat.longpoll", error = %err, "poll failed");
						return got_online;
					}
				}
			}

			if sender.is_none() {
				if let Some(action) = host.send_buffer().unsent() {
					let channel = match self.send(host, &action, url) {
						Ok(channel) => channel,
						Err(err) => {
							warn!(target = "ninchat.longpoll", action = action.name(), error = %err, "send failed");
							return got_online;
						}
					};

					if action.id == 0 {
						host.send_buffer().remove_unsent_fire_and_forget();
					} else {
						sender = Some(channel);
						sending_id = action.id;
					}
				}
			}

			let resolved = tokio::select! {
				batch = wait(&mut poller) => Resolved::Poll(batch),
				batch = wait(&mut sender) => Resolved::Send(batch),
				signal = host.signals().next() => Resolved::Signal(signal),
			};

			let batch = match resolved {
				Resolved::Poll(batch) => {
					if batch.is_none() {
						info!(target = "ninchat.longpoll", "poll timeout");
					}
					poller = None;
					host.conn_active();
					batch
				}
				Resolved::Send(batch) => {
					if batch.is_none() {
						info!(target = "ninchat.longpoll", action_id = sending_id, "send timeout");
					} else if sending_id > 0 {
						host.send_buffer().mark_sent(sending_id);
					}
					sender = None;
					sending_id = 0;
					batch
				}
				Resolved::Signal(Signal::Sending(true)) => continue,
				Resolved::Signal(Signal::Sending(false) | Signal::Close) => {
					debug!(target = "ninchat.longpoll", "closing session");
					self.close(host.session_id().as_ref(), url);
					return got_online;
				}
			};

			let Some(batch) = batch else {
				timeouts += 1;
				host.send_buffer().reset_sent();
				continue;
			};

			timeouts = 0;

			for value in batch {
				let event = match Event::decode(value) {
					Ok(event) => event,
					Err(err) => {
						warn!(target = "ninchat.longpoll", error = %err, "undecodable event");
						return got_online;
					}
				};

				let outcome = host.handle_event(event.header, event.payload);

				// The poll may confirm the action before its own send response arrives.
				if sending_id > 0 && sending_id <= outcome.acked_action_id {
					host.send_buffer().mark_sent(sending_id);
					sending_id = 0;
				}

				if !outcome.ok {
					return got_online;
				}

				if !got_online {
					got_online = true;
					host.connected();
				}
			}
		}

		info!(target = "ninchat.longpoll", "giving up after consecutive timeouts");
		got_online
	}

	/// Dispatches one buffered action with the encoding its size calls for.
	fn send<H: SessionHost>(&self, host: &H, action: &Action, url: &str) -> Result<ResponseChannel> {
		let session_id = host.session_id();
		let credentials = host.caller_credentials();
		let timeout = jitter(self.config.send_timeout, self.config.jitter);

		match encode_action(action, session_id.as_ref(), &credentials, self.config.max_jsonp_size)? {
			Outbound::Jsonp(json) => {
				debug!(target = "ninchat.longpoll", action = action.name(), action_id = action.id, size = json.len(), "send");
				self.issuer.jsonp(url, json, timeout)
			}
			Outbound::Post(header) => {
				debug!(target = "ninchat.longpoll", action = action.name(), action_id = action.id, "send via post");
				self.issuer.post(&self.config.call_url(host.address()), header, timeout)
			}
		}
	}

	fn issue_jsonp(&self, url: &str, header: &Header, timeout: std::time::Duration) -> Result<ResponseChannel> {
		let data = serde_json::to_string(header)?;
		self.issuer.jsonp(url, data, timeout)
	}
}

/// Awaits an in-flight request, or never resolves when there is none.
async fn wait(channel: &mut Option<ResponseChannel>) -> Option<Batch> {
	match channel {
		Some(channel) => channel.await,
		None => std::future::pending().await,
	}
}
