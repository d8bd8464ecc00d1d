//! Session creation and resumption before the transfer loop starts.

mod common;

use std::time::Duration;

use common::*;
use ninchat::RequestKind;
use serde_json::json;

#[tokio::test]
async fn session_creation_goes_online_once() {
	let (host, _signals) = TestHost::new(None);
	let (handle, mut controller) = start(host);

	let create = next(&mut controller).await;
	assert_eq!(create.kind, RequestKind::Jsonp);
	assert_eq!(create.action(), Some("create_session"));
	assert_eq!(create.url, "https://poll.test/v2/poll");
	assert_eq!(create.timeout, Duration::from_secs(13));
	create.respond(vec![json!({"event": "session_created", "session_id": "s-1"})]);

	let poll = next(&mut controller).await;
	assert_eq!(poll.action(), Some("resume_session"));
	assert_eq!(poll.header["session_id"], "s-1");
	poll.respond(vec![json!({"event": "message_received", "payload": {"text": "hello"}})]);

	next(&mut controller).await.time_out();
	next(&mut controller).await.time_out();

	let (host, outcome) = finish(handle).await;
	assert!(outcome.conn_worked);
	assert!(outcome.got_online);
	assert_eq!(host.connected, 1);
	assert_eq!(host.events.len(), 1);
	assert_eq!(host.events[0].1, vec![r#"{"text":"hello"}"#.to_string()]);
}

#[tokio::test]
async fn session_creation_timeout_aborts_run() {
	let (host, _signals) = TestHost::new(None);
	let (handle, mut controller) = start(host);

	next(&mut controller).await.time_out();

	let (host, outcome) = finish(handle).await;
	assert!(outcome.conn_worked);
	assert!(!outcome.got_online);
	assert_eq!(host.connected, 0);
	assert!(controller.try_next_request().is_none());
}

#[tokio::test]
async fn rejected_session_event_aborts_run() {
	let (mut host, _signals) = TestHost::new(None);
	host.accept_session = false;
	let (handle, mut controller) = start(host);

	next(&mut controller).await.respond(vec![json!({"event": "error", "error_type": "user_not_found"})]);

	let (host, outcome) = finish(handle).await;
	assert!(!outcome.got_online);
	assert_eq!(host.connected, 0);
	assert!(controller.try_next_request().is_none());
}

#[tokio::test]
async fn empty_creation_answer_aborts_run() {
	let (host, _signals) = TestHost::new(None);
	let (handle, mut controller) = start(host);

	next(&mut controller).await.respond(vec![]);

	let (_, outcome) = finish(handle).await;
	assert!(!outcome.got_online);
}

#[tokio::test]
async fn close_during_creation_sends_close_session() {
	let (host, signals) = TestHost::new(None);
	let (handle, mut controller) = start(host);

	let _create = next(&mut controller).await;
	signals.close();

	let close = next(&mut controller).await;
	assert_eq!(close.action(), Some("close_session"));
	assert!(!close.header.contains_key("session_id"));

	let (host, outcome) = finish(handle).await;
	assert!(!outcome.got_online);
	assert_eq!(host.connected, 0);
}

#[tokio::test]
async fn resumption_pings_before_polling() {
	let (host, _signals) = TestHost::new(Some("s-9"));
	let (handle, mut controller) = start(host);

	let ping = next(&mut controller).await;
	assert_eq!(ping.action(), Some("ping"));
	assert_eq!(ping.header["session_id"], "s-9");
	assert!(!ping.header.contains_key("action_id"));
	assert_eq!(ping.timeout, Duration::from_secs(7));

	let poll = next(&mut controller).await;
	assert_eq!(poll.action(), Some("resume_session"));
	assert_eq!(poll.timeout, Duration::from_secs(64));
	poll.time_out();
	next(&mut controller).await.time_out();

	let (host, outcome) = finish(handle).await;
	assert!(outcome.conn_worked);
	assert!(!outcome.got_online);
	assert_eq!(host.connected, 0);
	assert_eq!(host.active, 2);
}

#[tokio::test]
async fn resumption_aborts_when_issuer_is_unavailable() {
	let (host, _signals) = TestHost::new(Some("s-9"));
	let (issuer, mut controller) = ninchat::FakeIssuer::new();
	controller.set_failing(true);
	let handle = spawn_run(ninchat::LongPollTransport::new(issuer, config()).unwrap(), host);

	let (host, outcome) = finish(handle).await;
	assert!(outcome.conn_worked);
	assert!(!outcome.got_online);
	assert_eq!(host.active, 0);
	assert!(controller.try_next_request().is_none());
}
