//! In-process pub/sub hub for single-node deployments.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use campus_core::config::realtime::RealtimeConfig;
use campus_core::result::AppResult;
use campus_core::traits::changes::{
    ChangeEvent, ChangeFeed, ChangeHandler, ChangePublisher, SubscriptionHandle,
};
use campus_core::types::filter::Filter;

/// In-memory change hub.
///
/// One broadcast channel per table. The local data store backend publishes
/// into the hub after each successful mutation, so subscribers converge
/// without polling. Publishing to a table with no subscribers is a no-op.
#[derive(Debug)]
pub struct MemoryChangeHub {
    /// Table name → broadcast sender.
    channels: DashMap<String, broadcast::Sender<ChangeEvent>>,
    /// Buffer size for per-table channels.
    buffer_size: usize,
}

impl MemoryChangeHub {
    /// Create a new in-memory change hub.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: DashMap::new(),
            buffer_size,
        }
    }

    /// Create a hub sized from configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::new(config.channel_buffer)
    }

    fn sender(&self, table: &str) -> broadcast::Sender<ChangeEvent> {
        self.channels
            .entry(table.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .clone()
    }

    /// Number of live subscriptions on a table.
    pub fn subscriber_count(&self, table: &str) -> usize {
        self.channels
            .get(table)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl ChangePublisher for MemoryChangeHub {
    fn publish(&self, event: ChangeEvent) {
        if let Some(tx) = self.channels.get(&event.table) {
            let _ = tx.send(event);
        }
    }
}

#[async_trait]
impl ChangeFeed for MemoryChangeHub {
    async fn subscribe(
        &self,
        table: &str,
        filter: Option<Filter>,
        handler: ChangeHandler,
    ) -> AppResult<SubscriptionHandle> {
        let mut rx = self.sender(table).subscribe();
        let table = table.to_string();

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if event.passes(filter.as_ref()) {
                            handler();
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events still mean "something changed".
                        debug!(table, skipped, "Change receiver lagged");
                        handler();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(SubscriptionHandle::new(move || task.abort()))
    }
}
