//! Webhook intake tests for `POST /history`.
//!
//! Every delivery is signed exactly as LINE would sign it; the mock
//! platform verifies signatures for real.

use axum::http::StatusCode;
use relay_api::handlers::webhook::REPLY_TEXT;
use relay_line::PlatformError;
use relay_testing::{EventBuilder, TestEnv, WebhookBuilder};

#[tokio::test]
async fn text_message_is_recorded_and_acknowledged() {
    let env = TestEnv::new();
    env.platform.add_profile("U123", "Alice").await;

    let webhook = WebhookBuilder::new()
        .event(EventBuilder::text_message("U123", "hello").reply_token("rtok-1"))
        .build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());

    let records = env.store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Alice");
    assert_eq!(records[0].message, "hello");
    assert_eq!(records[0].uid, "U123");

    let replies = env.platform.replies().await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].target, "rtok-1");
    assert_eq!(replies[0].text, REPLY_TEXT);
}

#[tokio::test]
async fn invalid_signature_is_rejected_without_side_effects() {
    let env = TestEnv::new();
    env.platform.add_profile("U123", "Alice").await;

    let webhook = WebhookBuilder::new()
        .event(EventBuilder::text_message("U123", "hello"))
        .signed_with("not-the-channel-secret")
        .build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json().unwrap(), serde_json::json!({}));
    assert!(env.store.records().await.is_empty());
    assert!(env.platform.replies().await.is_empty());
    assert!(env.platform.profile_lookups().await.is_empty());
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let env = TestEnv::new();

    let webhook =
        WebhookBuilder::new().event(EventBuilder::text_message("U1", "hi")).unsigned().build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(env.store.records().await.is_empty());
}

#[tokio::test]
async fn garbage_signature_is_rejected() {
    let env = TestEnv::new();

    let webhook = WebhookBuilder::new()
        .event(EventBuilder::text_message("U1", "hi"))
        .signature("definitely-not-base64!")
        .build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signed_but_malformed_body_is_server_error() {
    let env = TestEnv::new();

    let webhook = WebhookBuilder::new().raw_body(r#"{"destination":"U","events":"#).build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json().unwrap(), serde_json::json!({}));
}

#[tokio::test]
async fn oversized_body_is_server_error() {
    let env = TestEnv::new();
    env.platform.add_profile("U1", "Alice").await;

    let mut body = serde_json::to_vec(&serde_json::json!({ "events": [] })).unwrap();
    body.extend(std::iter::repeat(b' ').take(3 * 1024 * 1024));
    let webhook = WebhookBuilder::new().raw_body(body).build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json().unwrap(), serde_json::json!({}));
    assert!(env.store.records().await.is_empty());
}

#[tokio::test]
async fn two_events_are_processed_in_order() {
    let env = TestEnv::new();
    env.platform.add_profile("U1", "Alice").await;
    env.platform.add_profile("U2", "Bob").await;

    let webhook = WebhookBuilder::new()
        .event(EventBuilder::text_message("U1", "first").reply_token("r1"))
        .event(EventBuilder::text_message("U2", "second").reply_token("r2"))
        .build();

    let response = env.deliver(webhook).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    let records = env.store.records().await;
    let recorded: Vec<_> = records.iter().map(|r| (r.uid.as_str(), r.name.as_str())).collect();
    assert_eq!(recorded, [("U1", "Alice"), ("U2", "Bob")]);

    let replies: Vec<_> = env.platform.replies().await.into_iter().map(|r| r.target).collect();
    assert_eq!(replies, ["r1", "r2"]);
}

#[tokio::test]
async fn non_text_events_are_ignored() {
    let env = TestEnv::new();
    env.platform.add_profile("U1", "Alice").await;

    let webhook = WebhookBuilder::new()
        .event(EventBuilder::follow("U1"))
        .event(EventBuilder::non_text_message("U1"))
        .build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert!(env.store.records().await.is_empty());
    assert!(env.platform.replies().await.is_empty());
    assert!(env.platform.profile_lookups().await.is_empty());
}

#[tokio::test]
async fn empty_event_list_is_accepted() {
    let env = TestEnv::new();

    let response = env.deliver(WebhookBuilder::new().build()).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert!(env.store.records().await.is_empty());
}

#[tokio::test]
async fn profile_failure_still_records_with_empty_name() {
    let env = TestEnv::new();

    let webhook =
        WebhookBuilder::new().event(EventBuilder::text_message("U-unknown", "hi")).build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let records = env.store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "");
    assert_eq!(records[0].uid, "U-unknown");
    assert_eq!(env.platform.replies().await.len(), 1);
}

#[tokio::test]
async fn store_failure_does_not_block_reply_or_later_events() {
    let env = TestEnv::new();
    env.platform.add_profile("U1", "Alice").await;
    env.store.inject_create_error("connection reset").await;

    let webhook = WebhookBuilder::new()
        .event(EventBuilder::text_message("U1", "lost").reply_token("r1"))
        .event(EventBuilder::text_message("U1", "kept").reply_token("r2"))
        .build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let records = env.store.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].message, "kept");
    assert_eq!(env.platform.replies().await.len(), 2);
}

#[tokio::test]
async fn reply_failure_does_not_block_later_events() {
    let env = TestEnv::new();
    env.platform.add_profile("U1", "Alice").await;
    env.platform.fail_next_reply(PlatformError::api(400, "Invalid reply token")).await;

    let webhook = WebhookBuilder::new()
        .event(EventBuilder::text_message("U1", "one").reply_token("expired"))
        .event(EventBuilder::text_message("U1", "two").reply_token("fresh"))
        .build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(env.store.records().await.len(), 2);
    let replies = env.platform.replies().await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].target, "fresh");
}

#[tokio::test]
async fn event_without_user_id_is_skipped() {
    let env = TestEnv::new();

    let webhook = WebhookBuilder::new()
        .event(EventBuilder::text_message("ignored", "hi").from_group_without_user("C1"))
        .build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert!(env.store.records().await.is_empty());
    assert!(env.platform.replies().await.is_empty());
}

#[tokio::test]
async fn event_without_reply_token_is_recorded_without_reply() {
    let env = TestEnv::new();
    env.platform.add_profile("U1", "Alice").await;

    let webhook = WebhookBuilder::new()
        .event(EventBuilder::text_message("U1", "hi").without_reply_token())
        .build();

    let response = env.deliver(webhook).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(env.store.records().await.len(), 1);
    assert!(env.platform.replies().await.is_empty());
}

#[tokio::test]
async fn replayed_delivery_is_recorded_twice() {
    let env = TestEnv::new();
    env.platform.add_profile("U1", "Alice").await;

    let webhook = WebhookBuilder::new().event(EventBuilder::text_message("U1", "again")).build();

    env.deliver(webhook.clone()).await.unwrap();
    env.deliver(webhook).await.unwrap();

    assert_eq!(env.store.records().await.len(), 2);
}
