//! In-memory messaging platform for testing.
//!
//! Webhook verification is real: bodies must be signed with the mock's
//! channel secret. Profile lookups are answered from registered profiles and
//! outgoing pushes and replies are recorded instead of sent. Failures can be
//! injected per operation and are consumed by the next matching call.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::RwLock;

use crate::{
    error::{PlatformError, Result},
    events::{self, Event},
    platform::{MessagingPlatform, PlatformFuture, Profile},
    signature,
};

/// Channel secret used by [`MockPlatform::new`].
pub const TEST_CHANNEL_SECRET: &str = "test-channel-secret";

/// A message the mock would have sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// User id for pushes, reply token for replies.
    pub target: String,
    /// Message text.
    pub text: String,
}

#[derive(Default)]
struct Injected {
    profile: Option<PlatformError>,
    push: Option<PlatformError>,
    reply: Option<PlatformError>,
}

#[derive(Default)]
struct State {
    profiles: HashMap<String, Profile>,
    profile_lookups: Vec<String>,
    pushes: Vec<SentMessage>,
    replies: Vec<SentMessage>,
    injected: Injected,
    latency: Duration,
}

/// Mock LINE platform.
#[derive(Clone)]
pub struct MockPlatform {
    channel_secret: String,
    state: Arc<RwLock<State>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    /// Creates a mock that verifies webhooks against [`TEST_CHANNEL_SECRET`].
    pub fn new() -> Self {
        Self::with_secret(TEST_CHANNEL_SECRET)
    }

    /// Creates a mock with a custom channel secret.
    pub fn with_secret(channel_secret: impl Into<String>) -> Self {
        Self { channel_secret: channel_secret.into(), state: Arc::default() }
    }

    /// Signs a body the way LINE would for this mock's channel.
    pub fn sign(&self, body: &[u8]) -> String {
        signature::sign(body, &self.channel_secret)
    }

    /// Registers a profile returned by `get_profile`.
    pub async fn add_profile(&self, user_id: impl Into<String>, display_name: impl Into<String>) {
        let user_id = user_id.into();
        let profile = Profile::new(user_id.clone(), display_name);
        self.state.write().await.profiles.insert(user_id, profile);
    }

    /// User ids passed to `get_profile`, in call order.
    pub async fn profile_lookups(&self) -> Vec<String> {
        self.state.read().await.profile_lookups.clone()
    }

    /// Pushes recorded so far, in call order.
    pub async fn pushes(&self) -> Vec<SentMessage> {
        self.state.read().await.pushes.clone()
    }

    /// Replies recorded so far, in call order.
    pub async fn replies(&self) -> Vec<SentMessage> {
        self.state.read().await.replies.clone()
    }

    /// Delays every profile lookup, push and reply by `latency`.
    pub async fn set_latency(&self, latency: Duration) {
        self.state.write().await.latency = latency;
    }

    async fn simulate_latency(&self) {
        let latency = self.state.read().await.latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    /// Fails the next `get_profile` call.
    pub async fn fail_next_profile(&self, error: PlatformError) {
        self.state.write().await.injected.profile = Some(error);
    }

    /// Fails the next `push_text` call.
    pub async fn fail_next_push(&self, error: PlatformError) {
        self.state.write().await.injected.push = Some(error);
    }

    /// Fails the next `reply_text` call.
    pub async fn fail_next_reply(&self, error: PlatformError) {
        self.state.write().await.injected.reply = Some(error);
    }
}

impl MessagingPlatform for MockPlatform {
    fn parse_webhook(&self, signature: Option<&str>, body: &[u8]) -> Result<Vec<Event>> {
        events::parse_signed(&self.channel_secret, signature, body)
    }

    fn get_profile<'a>(&'a self, user_id: &'a str) -> PlatformFuture<'a, Profile> {
        Box::pin(async move {
            self.simulate_latency().await;
            let mut state = self.state.write().await;
            state.profile_lookups.push(user_id.to_string());

            if let Some(error) = state.injected.profile.take() {
                return Err(error);
            }

            state
                .profiles
                .get(user_id)
                .cloned()
                .ok_or_else(|| PlatformError::api(404, "Not found"))
        })
    }

    fn push_text<'a>(&'a self, to: &'a str, text: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.simulate_latency().await;
            let mut state = self.state.write().await;
            if let Some(error) = state.injected.push.take() {
                return Err(error);
            }

            state.pushes.push(SentMessage { target: to.to_string(), text: text.to_string() });
            Ok(())
        })
    }

    fn reply_text<'a>(&'a self, reply_token: &'a str, text: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.simulate_latency().await;
            let mut state = self.state.write().await;
            if let Some(error) = state.injected.reply.take() {
                return Err(error);
            }

            state
                .replies
                .push(SentMessage { target: reply_token.to_string(), text: text.to_string() });
            Ok(())
        })
    }
}
