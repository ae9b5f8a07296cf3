//! LINE webhook payload types.
//!
//! Only the fields the relay acts on are modeled. Unknown event types,
//! message types and source types deserialize into an `Other` variant so a
//! single unfamiliar event never rejects the whole delivery.

use serde::{Deserialize, Serialize};

use crate::{
    error::{PlatformError, Result},
    signature::validate_signature,
};

/// Body of a LINE webhook request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Bot user id the events were sent to.
    #[serde(default)]
    pub destination: String,
    /// Events in delivery order.
    pub events: Vec<Event>,
}

/// Single webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event type.
    #[serde(rename = "type")]
    pub kind: EventType,
    /// Token for replying to this event. Absent on events that cannot be
    /// replied to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_token: Option<String>,
    /// Where the event came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    /// Message content for message events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Event time in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: i64,
    /// Unique event id assigned by LINE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_event_id: Option<String>,
}

impl Event {
    /// Sender's user id, if the source carries one.
    pub fn user_id(&self) -> Option<&str> {
        self.source.as_ref()?.user_id.as_deref()
    }

    /// Message text when this is a text message event.
    pub fn text(&self) -> Option<&str> {
        match (&self.kind, &self.message) {
            (EventType::Message, Some(Message::Text { text, .. })) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Webhook event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// User sent a message.
    Message,
    /// User added the bot as a friend.
    Follow,
    /// User blocked the bot.
    Unfollow,
    /// Bot joined a group or room.
    Join,
    /// Bot left a group or room.
    Leave,
    /// User triggered a postback action.
    Postback,
    /// User entered a beacon's range.
    Beacon,
    /// Any event type the relay does not handle.
    #[serde(other)]
    Other,
}

/// Origin of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Source type.
    #[serde(rename = "type")]
    pub kind: SourceType,
    /// Sending user. May be absent in group and room sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Group id for group sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Room id for room sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
}

impl Source {
    /// One-on-one chat source for `user_id`.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self { kind: SourceType::User, user_id: Some(user_id.into()), group_id: None, room_id: None }
    }
}

/// Source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// One-on-one chat with a user.
    User,
    /// Group chat.
    Group,
    /// Multi-person room.
    Room,
    /// Unrecognized source type.
    #[serde(other)]
    Other,
}

/// Message content of a message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// Plain text message.
    Text {
        /// Message id.
        #[serde(default)]
        id: String,
        /// Message text.
        text: String,
    },
    /// Image, sticker, location and every other non-text message.
    #[serde(other)]
    Other,
}

/// Parses a webhook body without checking its signature.
///
/// # Errors
///
/// Returns `PlatformError::MalformedPayload` if the body is not a LINE
/// webhook payload.
pub fn parse_payload(body: &[u8]) -> Result<WebhookPayload> {
    serde_json::from_slice(body).map_err(|e| PlatformError::malformed(e.to_string()))
}

/// Verifies the signature over the raw body, then parses the events.
///
/// # Errors
///
/// Returns `PlatformError::InvalidSignature` if the signature is missing or
/// does not match, and `PlatformError::MalformedPayload` if a correctly
/// signed body does not parse.
pub fn parse_signed(
    channel_secret: &str,
    signature: Option<&str>,
    body: &[u8],
) -> Result<Vec<Event>> {
    let signature = signature.ok_or(PlatformError::InvalidSignature)?;

    let validation = validate_signature(body, signature, channel_secret);
    if !validation.is_valid {
        tracing::debug!(
            reason = validation.error_message.as_deref().unwrap_or("unknown"),
            "webhook signature rejected"
        );
        return Err(PlatformError::InvalidSignature);
    }

    Ok(parse_payload(body)?.events)
}
