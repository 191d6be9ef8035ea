//! Shared application state.

use std::sync::Arc;

use futureme_agent::FutureAgent;
use futureme_session::SessionStore;

use crate::config::ServerConfig;

/// State shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The conversation agent.
    pub agent: Arc<FutureAgent>,
    /// Server configuration.
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(agent: Arc<FutureAgent>, config: ServerConfig) -> Self {
        Self { agent, config }
    }

    /// The session store behind the agent.
    pub fn sessions(&self) -> &SessionStore {
        self.agent.sessions()
    }
}
