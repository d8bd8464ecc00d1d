//! Ordered outbound action buffer shared with the application.
//!
//! The application only appends; the transport reads at the sent index and
//! removes nothing but fire-and-forget actions sitting exactly there, so
//! concurrent appends never shift the entries the transport is looking at.

use std::sync::Arc;

use ninchat_protocol::Action;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct BufferState {
	actions: Vec<Action>,
	/// Leading actions already dispatched and awaiting their ack event.
	num_sent: usize,
}

/// Cloneable handle to a session's outbound buffer.
#[derive(Debug, Clone, Default)]
pub struct SendBuffer {
	inner: Arc<Mutex<BufferState>>,
}

impl SendBuffer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends an action to the end of the buffer.
	pub fn push(&self, action: Action) {
		self.inner.lock().actions.push(action);
	}

	pub fn len(&self) -> usize {
		self.inner.lock().actions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.lock().actions.is_empty()
	}

	pub fn num_sent(&self) -> usize {
		self.inner.lock().num_sent
	}

	/// The first action not yet sent, if any.
	pub fn unsent(&self) -> Option<Action> {
		let state = self.inner.lock();
		state.actions.get(state.num_sent).cloned()
	}

	/// Rewinds so the next send starts again from the front.
	pub fn reset_sent(&self) {
		self.inner.lock().num_sent = 0;
	}

	/// Counts the action at the sent index as sent, if it carries `id`.
	///
	/// Returns `false` when the action was already retired or removed, so
	/// racing confirmations from the poll and send paths count only once.
	pub fn mark_sent(&self, id: u64) -> bool {
		let mut state = self.inner.lock();
		let index = state.num_sent;
		match state.actions.get(index) {
			Some(action) if id > 0 && action.id == id => {
				state.num_sent += 1;
				true
			}
			_ => false,
		}
	}

	/// Removes the action at the sent index if it is fire-and-forget.
	pub fn remove_unsent_fire_and_forget(&self) -> Option<Action> {
		let mut state = self.inner.lock();
		let index = state.num_sent;
		if state.actions.get(index).is_some_and(|action| action.id == 0) {
			Some(state.actions.remove(index))
		} else {
			None
		}
	}

	/// Drops a server-confirmed action, keeping the sent index aligned.
	///
	/// Session hosts call this from their event handler when an event
	/// carries an `action_id`.
	pub fn acknowledge(&self, id: u64) -> Option<Action> {
		if id == 0 {
			return None;
		}

		let mut state = self.inner.lock();
		let index = state.actions.iter().position(|action| action.id == id)?;
		if index < state.num_sent {
			state.num_sent -= 1;
		}
		Some(state.actions.remove(index))
	}
}
