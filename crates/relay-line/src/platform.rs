//! Messaging platform abstraction used by the HTTP handlers.
//!
//! The handlers depend on `MessagingPlatform` rather than on `LineClient`
//! so tests can swap in [`crate::mock::MockPlatform`] without a network.

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};

use crate::{client::LineClient, error::Result, events::Event};

/// Boxed future returned by async platform operations.
pub type PlatformFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// LINE user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// User id the profile belongs to.
    #[serde(default)]
    pub user_id: String,
    /// Display name shown in LINE.
    pub display_name: String,
    /// Profile image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    /// Status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    /// Language setting, when the user has shared it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Profile {
    /// Creates a profile with only id and display name set.
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            picture_url: None,
            status_message: None,
            language: None,
        }
    }
}

/// Operations the relay needs from a messaging platform.
pub trait MessagingPlatform: Send + Sync + 'static {
    /// Authenticates a webhook body against its signature header value and
    /// returns the events it carries.
    ///
    /// # Errors
    ///
    /// `PlatformError::InvalidSignature` for a missing or wrong signature;
    /// any other error for a body that fails to parse.
    fn parse_webhook(&self, signature: Option<&str>, body: &[u8]) -> Result<Vec<Event>>;

    /// Looks up a user's profile.
    fn get_profile<'a>(&'a self, user_id: &'a str) -> PlatformFuture<'a, Profile>;

    /// Sends a text message to a user.
    fn push_text<'a>(&'a self, to: &'a str, text: &'a str) -> PlatformFuture<'a, ()>;

    /// Replies to an event with a text message.
    fn reply_text<'a>(&'a self, reply_token: &'a str, text: &'a str) -> PlatformFuture<'a, ()>;
}

impl MessagingPlatform for LineClient {
    fn parse_webhook(&self, signature: Option<&str>, body: &[u8]) -> Result<Vec<Event>> {
        LineClient::parse_webhook(self, signature, body)
    }

    fn get_profile<'a>(&'a self, user_id: &'a str) -> PlatformFuture<'a, Profile> {
        Box::pin(LineClient::get_profile(self, user_id))
    }

    fn push_text<'a>(&'a self, to: &'a str, text: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(LineClient::push_text(self, to, text))
    }

    fn reply_text<'a>(&'a self, reply_token: &'a str, text: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(LineClient::reply_text(self, reply_token, text))
    }
}
