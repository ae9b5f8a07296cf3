//! HTTP API for the LINE relay.
//!
//! Three endpoints make up the relay itself: `POST /history` receives LINE
//! webhooks and records inbound text messages, `GET /history` lists what was
//! recorded for a display name, and `POST /message` pushes a message to the
//! user most recently seen under a display name. `/health` and `/live`
//! serve orchestration probes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::{create_router, start_server};
pub use state::AppState;
