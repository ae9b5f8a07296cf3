//! HTTP client for the LINE Messaging API.
//!
//! Covers the three calls the relay makes: profile lookup, push message and
//! reply message. Every call authenticates with the channel access token as
//! a bearer token. Non-2xx responses become `PlatformError::Api` carrying the
//! `message` field LINE returns in its error body.

use std::{fmt, time::Duration};

use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};

use crate::{
    error::{PlatformError, Result},
    events::{self, Event},
    platform::Profile,
};

/// Default LINE API origin.
pub const DEFAULT_API_BASE_URL: &str = "https://api.line.me";

/// Configuration for the LINE client.
#[derive(Clone)]
pub struct LineConfig {
    /// Channel secret used to verify webhook signatures.
    pub channel_secret: String,
    /// Long-lived channel access token for API calls.
    pub channel_access_token: String,
    /// API origin. Overridden in tests to point at a local mock server.
    pub api_base_url: String,
    /// Timeout applied to every API request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl LineConfig {
    /// Creates a configuration with default origin, timeout and user agent.
    pub fn new(channel_secret: impl Into<String>, channel_access_token: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
            channel_access_token: channel_access_token.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: concat!("line-relay/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Overrides the API origin.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_secret", &"***")
            .field("channel_access_token", &"***")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OutgoingMessage<'a> {
    Text { text: &'a str },
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: [OutgoingMessage<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [OutgoingMessage<'a>; 1],
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for the LINE Messaging API.
#[derive(Debug, Clone)]
pub struct LineClient {
    client: reqwest::Client,
    config: LineConfig,
    base_url: Url,
}

impl LineClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Configuration` if the secret or token is
    /// empty, the base URL does not parse, or the HTTP client cannot be
    /// built.
    pub fn new(config: LineConfig) -> Result<Self> {
        if config.channel_secret.is_empty() {
            return Err(PlatformError::configuration("channel secret is empty"));
        }
        if config.channel_access_token.is_empty() {
            return Err(PlatformError::configuration("channel access token is empty"));
        }

        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            PlatformError::configuration(format!("invalid API base URL {}: {e}", config.api_base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PlatformError::configuration(format!(
                "API base URL cannot be a base: {}",
                config.api_base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                PlatformError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config, base_url })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    /// Verifies and parses a webhook request body.
    ///
    /// # Errors
    ///
    /// See [`events::parse_signed`].
    pub fn parse_webhook(&self, signature: Option<&str>, body: &[u8]) -> Result<Vec<Event>> {
        events::parse_signed(&self.config.channel_secret, signature, body)
    }

    /// Fetches the profile of a user who has added the bot.
    ///
    /// # Errors
    ///
    /// Returns `Network` or `Timeout` on transport failure, `Api` on a
    /// non-2xx response, and `MalformedPayload` if the profile does not
    /// parse.
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        let span = info_span!("line_get_profile", user_id = %user_id);

        async move {
            let url = self.endpoint(&["v2", "bot", "profile", user_id])?;
            let request = self.client.get(url).bearer_auth(&self.config.channel_access_token);

            let response = self.send(request).await?;
            let profile = response.json::<Profile>().await.map_err(|e| {
                PlatformError::malformed(format!("failed to parse profile response: {e}"))
            })?;

            tracing::debug!(display_name = %profile.display_name, "fetched profile");
            Ok(profile)
        }
        .instrument(span)
        .await
    }

    /// Pushes a text message to a user.
    ///
    /// # Errors
    ///
    /// Returns `Network` or `Timeout` on transport failure and `Api` on a
    /// non-2xx response.
    pub async fn push_text(&self, to: &str, text: &str) -> Result<()> {
        let span = info_span!("line_push", to = %to);
        let body = PushRequest { to, messages: [OutgoingMessage::Text { text }] };

        self.post_json(&["v2", "bot", "message", "push"], &body).instrument(span).await
    }

    /// Replies to a webhook event using its reply token.
    ///
    /// # Errors
    ///
    /// Returns `Network` or `Timeout` on transport failure and `Api` on a
    /// non-2xx response, including an expired or reused reply token.
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()> {
        let span = info_span!("line_reply");
        let body = ReplyRequest { reply_token, messages: [OutgoingMessage::Text { text }] };

        self.post_json(&["v2", "bot", "message", "reply"], &body).instrument(span).await
    }

    async fn post_json<T: Serialize + ?Sized>(&self, segments: &[&str], body: &T) -> Result<()> {
        let url = self.endpoint(segments)?;
        let request =
            self.client.post(url).bearer_auth(&self.config.channel_access_token).json(body);

        self.send(request).await?;
        tracing::debug!("LINE API request accepted");
        Ok(())
    }

    /// Sends a request and maps transport failures and non-2xx statuses.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let start_time = std::time::Instant::now();

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    duration_ms = start_time.elapsed().as_millis(),
                    "LINE API request failed: {}",
                    e
                );

                if e.is_timeout() {
                    return Err(PlatformError::timeout(self.config.timeout.as_secs()));
                }
                if e.is_connect() {
                    return Err(PlatformError::network(format!("connection failed: {e}")));
                }
                return Err(PlatformError::network(e.to_string()));
            },
        };

        let status = response.status();
        tracing::debug!(
            status = status.as_u16(),
            duration_ms = start_time.elapsed().as_millis(),
            "received LINE API response"
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| if body.is_empty() { status.to_string() } else { body });

        tracing::warn!(status = status.as_u16(), error = %message, "LINE API error response");
        Err(PlatformError::api(status.as_u16(), message))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PlatformError::configuration("API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> LineClient {
        let config = LineConfig::new("secret", "token").with_api_base_url(server.uri());
        LineClient::new(config).unwrap()
    }

    #[test]
    fn rejects_empty_credentials() {
        let err = LineClient::new(LineConfig::new("", "token")).unwrap_err();
        assert!(matches!(err, PlatformError::Configuration { .. }));

        let err = LineClient::new(LineConfig::new("secret", "")).unwrap_err();
        assert!(matches!(err, PlatformError::Configuration { .. }));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let config = LineConfig::new("secret", "token").with_api_base_url("not a url");
        let err = LineClient::new(config).unwrap_err();
        assert!(matches!(err, PlatformError::Configuration { .. }));
    }

    #[test]
    fn debug_output_masks_credentials() {
        let output = format!("{:?}", LineConfig::new("channel-secret", "access-token"));
        assert!(!output.contains("channel-secret"));
        assert!(!output.contains("access-token"));
        assert!(output.contains("api.line.me"));
    }

    #[tokio::test]
    async fn get_profile_success() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .and(matchers::path("/v2/bot/profile/U123"))
            .and(matchers::header("authorization", "Bearer token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "displayName": "Alice",
                "userId": "U123",
                "language": "en",
                "pictureUrl": "https://profile.line-scdn.net/abc",
                "statusMessage": "Hello"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server).get_profile("U123").await.unwrap();

        assert_eq!(profile.display_name, "Alice");
        assert_eq!(profile.user_id, "U123");
        assert_eq!(profile.status_message.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn get_profile_not_found() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).get_profile("Unknown").await.unwrap_err();

        assert_eq!(err, PlatformError::api(404, "Not found"));
    }

    #[tokio::test]
    async fn push_text_sends_line_message_shape() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v2/bot/message/push"))
            .and(matchers::header("authorization", "Bearer token"))
            .and(matchers::body_json(json!({
                "to": "U123",
                "messages": [{"type": "text", "text": "hi there"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).push_text("U123", "hi there").await.unwrap();
    }

    #[tokio::test]
    async fn reply_text_sends_reply_token() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v2/bot/message/reply"))
            .and(matchers::body_json(json!({
                "replyToken": "rtok",
                "messages": [{"type": "text", "text": "message saved"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).reply_text("rtok", "message saved").await.unwrap();
    }

    #[tokio::test]
    async fn api_error_without_json_body_uses_raw_text() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = client_for(&server).push_text("U1", "x").await.unwrap_err();

        assert_eq!(err, PlatformError::api(500, "upstream exploded"));
    }

    #[tokio::test]
    async fn invalid_reply_token_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v2/bot/message/reply"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid reply token"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).reply_text("expired", "message saved").await.unwrap_err();

        assert!(matches!(err, PlatformError::Api { status: 400, .. }));
    }

    #[tokio::test]
    async fn slow_api_times_out() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let config = LineConfig::new("secret", "token")
            .with_api_base_url(server.uri())
            .with_timeout(Duration::from_millis(100));
        let client = LineClient::new(config).unwrap();

        let err = client.push_text("U1", "x").await.unwrap_err();

        assert!(matches!(err, PlatformError::Timeout { .. }));
    }

    #[tokio::test]
    async fn unreachable_api_is_network_error() {
        let config = LineConfig::new("secret", "token").with_api_base_url("http://127.0.0.1:1");
        let client = LineClient::new(config).unwrap();

        let err = client.push_text("U1", "x").await.unwrap_err();

        assert!(matches!(err, PlatformError::Network { .. }));
    }
}
