use std::sync::Arc;

use twilight_http::Client;

use rusty_interactive::{InteractiveConfig, InteractiveHttp, InteractiveService};

/// Shared application context passed into command handlers.
///
/// Cheap to clone because it only stores reference-counted shared state.
#[derive(Clone)]
pub struct Context {
    pub http: Arc<Client>,
    pub interactive: InteractiveService,
}

impl Context {
    /// Create a new application context with an interactive service on the same client.
    pub fn new(http: Arc<Client>, config: InteractiveConfig) -> Self {
        let platform: Arc<dyn InteractiveHttp> = http.clone();

        Self {
            interactive: InteractiveService::new(platform, config),
            http,
        }
    }
}
