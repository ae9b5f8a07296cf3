//! Shared application state handed to every handler.

use std::sync::Arc;

use relay_core::HistoryStore;
use relay_line::MessagingPlatform;

/// Dependencies shared by all request handlers.
///
/// Cloning is cheap; both fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// History record store.
    pub store: Arc<dyn HistoryStore>,
    /// Messaging platform used for profile lookups and sends.
    pub platform: Arc<dyn MessagingPlatform>,
}

impl AppState {
    /// Creates application state from a store and a platform.
    pub fn new(store: Arc<dyn HistoryStore>, platform: Arc<dyn MessagingPlatform>) -> Self {
        Self { store, platform }
    }
}
