//! Realtime change feed configuration.

use serde::{Deserialize, Serialize};

/// Settings for realtime change delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket URL of the hosted change feed. When absent, the in-process
    /// hub is the only available feed.
    pub websocket_url: Option<String>,
    /// Buffer size for in-process change channels.
    #[serde(default = "default_buffer_size")]
    pub channel_buffer: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            websocket_url: None,
            channel_buffer: default_buffer_size(),
        }
    }
}

fn default_buffer_size() -> usize {
    64
}
