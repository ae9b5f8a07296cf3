//! Test data builders for LINE webhook deliveries.
//!
//! Builders produce real webhook JSON and sign it with the mock platform's
//! channel secret unless told otherwise.

use axum::{body::Body, http::Request};
use bytes::Bytes;
use relay_line::{
    events::{Event, EventType, Message, Source, SourceType, WebhookPayload},
    mock::TEST_CHANNEL_SECRET,
    signature, SIGNATURE_HEADER,
};
use uuid::Uuid;

/// Builder for a single webhook event.
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    /// Text message from a user in a one-on-one chat.
    pub fn text_message(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            event: Event {
                kind: EventType::Message,
                reply_token: Some(format!("reply-{}", Uuid::new_v4().simple())),
                source: Some(Source::user(user_id)),
                message: Some(Message::Text {
                    id: Uuid::new_v4().simple().to_string(),
                    text: text.into(),
                }),
                timestamp: 1_700_000_000_000,
                webhook_event_id: Some(Uuid::new_v4().simple().to_string()),
            },
        }
    }

    /// Non-text message (sticker, image, ...) from a user.
    pub fn non_text_message(user_id: impl Into<String>) -> Self {
        let mut builder = Self::text_message(user_id, "");
        builder.event.message = Some(Message::Other);
        builder
    }

    /// Follow event from a user.
    pub fn follow(user_id: impl Into<String>) -> Self {
        let mut builder = Self::text_message(user_id, "");
        builder.event.kind = EventType::Follow;
        builder.event.message = None;
        builder
    }

    /// Sets the reply token.
    #[must_use]
    pub fn reply_token(mut self, token: impl Into<String>) -> Self {
        self.event.reply_token = Some(token.into());
        self
    }

    /// Removes the reply token.
    #[must_use]
    pub fn without_reply_token(mut self) -> Self {
        self.event.reply_token = None;
        self
    }

    /// Moves the event into a group chat without a sender user id.
    #[must_use]
    pub fn from_group_without_user(mut self, group_id: impl Into<String>) -> Self {
        self.event.source = Some(Source {
            kind: SourceType::Group,
            user_id: None,
            group_id: Some(group_id.into()),
            room_id: None,
        });
        self
    }

    /// Builds the event.
    pub fn build(self) -> Event {
        self.event
    }
}

/// How the webhook request is signed.
enum Signing {
    Secret(String),
    Raw(String),
    Unsigned,
}

/// Builder for a complete webhook delivery.
pub struct WebhookBuilder {
    destination: String,
    events: Vec<Event>,
    raw_body: Option<Bytes>,
    signing: Signing,
}

impl Default for WebhookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookBuilder {
    /// Creates an empty delivery signed with [`TEST_CHANNEL_SECRET`].
    pub fn new() -> Self {
        Self {
            destination: "Ubot0000000000000000000000000000".to_string(),
            events: Vec::new(),
            raw_body: None,
            signing: Signing::Secret(TEST_CHANNEL_SECRET.to_string()),
        }
    }

    /// Appends an event.
    #[must_use]
    pub fn event(mut self, event: impl Into<Event>) -> Self {
        self.events.push(event.into());
        self
    }

    /// Replaces the JSON body with raw bytes, still signed as configured.
    #[must_use]
    pub fn raw_body(mut self, body: impl Into<Bytes>) -> Self {
        self.raw_body = Some(body.into());
        self
    }

    /// Signs with a different channel secret.
    #[must_use]
    pub fn signed_with(mut self, secret: impl Into<String>) -> Self {
        self.signing = Signing::Secret(secret.into());
        self
    }

    /// Sends a literal signature header value.
    #[must_use]
    pub fn signature(mut self, value: impl Into<String>) -> Self {
        self.signing = Signing::Raw(value.into());
        self
    }

    /// Omits the signature header.
    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.signing = Signing::Unsigned;
        self
    }

    /// Builds the delivery.
    pub fn build(self) -> TestWebhook {
        let body = self.raw_body.unwrap_or_else(|| {
            let payload = WebhookPayload { destination: self.destination, events: self.events };
            Bytes::from(serde_json::to_vec(&payload).unwrap_or_default())
        });

        let signature = match self.signing {
            Signing::Secret(secret) => Some(signature::sign(&body, &secret)),
            Signing::Raw(value) => Some(value),
            Signing::Unsigned => None,
        };

        TestWebhook { body, signature }
    }
}

impl From<EventBuilder> for Event {
    fn from(builder: EventBuilder) -> Self {
        builder.build()
    }
}

/// A built webhook delivery.
#[derive(Debug, Clone)]
pub struct TestWebhook {
    /// Raw request body.
    pub body: Bytes,
    /// Value of the signature header, if sent.
    pub signature: Option<String>,
}

impl TestWebhook {
    /// Converts into a `POST /history` request.
    pub fn into_request(self) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/history")
            .header("content-type", "application/json");

        if let Some(signature) = self.signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }

        builder.body(Body::from(self.body)).unwrap_or_default()
    }
}

/// Form-encoded `POST /message` request.
pub fn send_message_request(name: &str, msg: &str) -> Request<Body> {
    let body = format!("name={}&msg={}", urlencoding::encode(name), urlencoding::encode(msg));

    Request::builder()
        .method("POST")
        .uri("/message")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap_or_default()
}

/// Boundary used by [`send_message_multipart_request`].
pub const MULTIPART_BOUNDARY: &str = "relay-test-boundary";

/// Multipart `POST /message` request with the given fields, in order.
pub fn send_message_multipart_request(fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/message")
        .header("content-type", format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"))
        .body(Body::from(body))
        .unwrap_or_default()
}

/// `GET /history?name=` request.
pub fn history_request(name: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/history?name={}", urlencoding::encode(name)))
        .body(Body::empty())
        .unwrap_or_default()
}
