//! WebSocket client for the hosted store's change feed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use campus_core::config::realtime::RealtimeConfig;
use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;
use campus_core::traits::changes::{ChangeFeed, ChangeHandler, SubscriptionHandle};
use campus_core::types::filter::Filter;

use super::frame::{ClientFrame, ServerFrame};

/// Topic key → registered handlers keyed by subscription id.
type TopicRegistry = Arc<DashMap<String, HashMap<u64, ChangeHandler>>>;

/// Change feed client multiplexing topic subscriptions over one websocket.
///
/// The endpoint applies each topic's filter server-side; this client only
/// routes incoming frames to the handlers registered for the topic. When
/// the connection drops, established handlers stop firing and new
/// subscriptions fail with a transport error; the merged view is
/// re-derivable, so no replay machinery exists here.
pub struct RemoteChangeFeed {
    /// Live subscriptions by topic.
    topics: TopicRegistry,
    /// Outbound frames to the writer task.
    outbound: mpsc::UnboundedSender<ClientFrame>,
    /// Next subscription id.
    next_id: AtomicU64,
}

impl RemoteChangeFeed {
    /// Connect to the change feed endpoint and start the read/write loops.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let (socket, _) = connect_async(url).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Transport,
                format!("Change feed connect failed: {e}"),
                e,
            )
        })?;
        info!(url, "Connected to change feed");

        let (mut sink, mut stream) = socket.split();
        let (outbound, mut pending) = mpsc::unbounded_channel::<ClientFrame>();

        tokio::spawn(async move {
            while let Some(frame) = pending.recv().await {
                let Ok(text) = serde_json::to_string(&frame) else {
                    continue;
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    warn!("Change feed write loop terminated");
                    break;
                }
            }
        });

        let topics: TopicRegistry = Arc::new(DashMap::new());
        let routing = Arc::clone(&topics);
        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(frame) => dispatch(&routing, &frame),
                        Err(e) => debug!(error = %e, "Ignoring malformed change frame"),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Change feed read failed");
                        break;
                    }
                }
            }
            warn!("Change feed read loop terminated");
        });

        Ok(Self {
            topics,
            outbound,
            next_id: AtomicU64::new(0),
        })
    }

    /// Connect using the configured websocket URL.
    pub async fn from_config(config: &RealtimeConfig) -> AppResult<Self> {
        let url = config.websocket_url.as_deref().ok_or_else(|| {
            AppError::configuration("No websocket URL configured for the change feed")
        })?;
        Self::connect(url).await
    }

    /// Topic key for a table and optional filter.
    fn topic_for(table: &str, filter: Option<&Filter>) -> String {
        match filter {
            Some(filter) => {
                let (field, value) = filter.as_query_pair();
                format!("{table}?{field}={value}")
            }
            None => table.to_string(),
        }
    }
}

fn dispatch(topics: &TopicRegistry, frame: &ServerFrame) {
    // Clone handlers out of the map entry so callbacks run without holding it.
    let handlers: Vec<ChangeHandler> = topics
        .get(&frame.topic)
        .map(|entry| entry.values().cloned().collect())
        .unwrap_or_default();
    for handler in handlers {
        handler();
    }
}

#[async_trait]
impl ChangeFeed for RemoteChangeFeed {
    async fn subscribe(
        &self,
        table: &str,
        filter: Option<Filter>,
        handler: ChangeHandler,
    ) -> AppResult<SubscriptionHandle> {
        let topic = Self::topic_for(table, filter.as_ref());
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let first = {
            let mut entry = self.topics.entry(topic.clone()).or_default();
            let first = entry.is_empty();
            entry.insert(id, handler);
            first
        };

        if first
            && self
                .outbound
                .send(ClientFrame::Subscribe {
                    topic: topic.clone(),
                })
                .is_err()
        {
            if let Some(mut entry) = self.topics.get_mut(&topic) {
                entry.remove(&id);
            }
            return Err(AppError::subscription("Change feed connection is closed"));
        }
        debug!(topic, "Subscribed to change feed topic");

        let topics = Arc::clone(&self.topics);
        let outbound = self.outbound.clone();
        Ok(SubscriptionHandle::new(move || {
            let mut last = false;
            if let Some(mut entry) = topics.get_mut(&topic) {
                entry.remove(&id);
                last = entry.is_empty();
            }
            if last {
                topics.remove_if(&topic, |_, handlers| handlers.is_empty());
                let _ = outbound.send(ClientFrame::Unsubscribe { topic });
            }
        }))
    }
}

impl fmt::Debug for RemoteChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteChangeFeed")
            .field("topics", &self.topics.len())
            .finish()
    }
}
