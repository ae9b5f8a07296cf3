//! HTTP request handlers for the relay API.
//!
//! - `webhook` - LINE webhook intake (`POST /history`)
//! - `history` - history listing (`GET /history`)
//! - `message` - message push by display name (`POST /message`)
//! - `health` - health and liveness probes
//!
//! None of the relay handlers surface errors to axum. Failures are logged
//! and mapped to the status and body each endpoint documents.

pub mod health;
pub mod history;
pub mod message;
pub mod webhook;

pub use health::{health_check, liveness_check};
pub use history::query_history;
pub use message::send_message;
pub use webhook::receive_webhook;
