//! Wire types for the Ninchat long-poll protocol.
//!
//! This crate contains the shapes of data exchanged with the Ninchat API
//! over the long-poll transport. Headers are kept as JSON objects because
//! the transport only inspects a handful of fields (`action`, `session_id`,
//! `payload`, `action_id`) and passes the rest through untouched.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No I/O, no timers, no logging
//! * Minimal: Only what the transport must read or attach
//! * Stable: Changes only when the wire protocol changes
//!
//! The transport itself lives in `ninchat-rs`.

pub mod action;
pub mod data_uri;
pub mod error;
pub mod event;
pub mod jsonp;
pub mod types;

pub use action::*;
pub use data_uri::*;
pub use error::*;
pub use event::*;
pub use jsonp::*;
pub use types::*;
