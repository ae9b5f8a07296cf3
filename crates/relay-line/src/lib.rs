//! LINE Messaging API integration for the relay.
//!
//! Verifies and parses incoming webhooks, looks up user profiles, and sends
//! push and reply messages. The [`MessagingPlatform`] trait is the seam the
//! HTTP layer depends on; [`LineClient`] implements it against the real API
//! and [`mock::MockPlatform`] implements it in memory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod events;
pub mod mock;
pub mod platform;
pub mod signature;

pub use client::{LineClient, LineConfig};
pub use error::{PlatformError, Result};
pub use events::{Event, EventType, Message, Source, WebhookPayload};
pub use platform::{MessagingPlatform, PlatformFuture, Profile};
pub use signature::SIGNATURE_HEADER;
