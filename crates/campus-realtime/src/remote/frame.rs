//! Wire frames exchanged with the hosted change feed.

use serde::{Deserialize, Serialize};

/// Frames sent by this client to the change feed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Start delivery for a topic.
    Subscribe {
        /// Topic key: table name, optionally suffixed with a filter.
        topic: String,
    },
    /// Stop delivery for a topic.
    Unsubscribe {
        /// Topic key previously subscribed.
        topic: String,
    },
}

/// A change frame delivered by the endpoint.
///
/// The row snapshot is carried for completeness but never interpreted here;
/// the endpoint has already applied the topic's filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerFrame {
    /// Topic key the change belongs to.
    pub topic: String,
    /// Snapshot of the changed row, when the endpoint includes one.
    #[serde(default)]
    pub row: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_frame_wire_shape() {
        let frame = ClientFrame::Subscribe {
            topic: "notices".to_string(),
        };
        let json = serde_json::to_value(&frame).expect("serialize");
        assert_eq!(json["type"], "subscribe");
        assert_eq!(json["topic"], "notices");
    }

    #[test]
    fn test_server_frame_row_is_optional() {
        let frame: ServerFrame =
            serde_json::from_str(r#"{"topic": "notice_reads?user_id=eq.u-1"}"#).expect("parse");
        assert!(frame.row.is_none());
    }
}
