use std::sync::atomic::Ordering;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use super::Gateway;

/// Control messages a page can post to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayMessage {
    SkipWaiting,
    GetVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageReply {
    Version { version: String },
}

impl Gateway {
    /// Handle a control message. `GetVersion` answers on `reply`; a closed
    /// or missing channel drops the answer.
    pub fn handle_message(&self, message: GatewayMessage, reply: Option<oneshot::Sender<MessageReply>>) {
        match message {
            GatewayMessage::SkipWaiting => {
                tracing::info!("skip waiting requested");
                self.skip_waiting.store(true, Ordering::SeqCst);
            }
            GatewayMessage::GetVersion => {
                let Some(reply) = reply else {
                    tracing::warn!("GET_VERSION without a reply channel");
                    return;
                };
                let version = MessageReply::Version { version: self.config.version.clone() };
                if reply.send(version).is_err() {
                    tracing::debug!("version reply dropped, receiver gone");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::mock::MockNetwork;
    use waystation_core::CacheDb;

    #[test]
    fn test_message_wire_format() {
        let skip: GatewayMessage = serde_json::from_str(r#"{"type":"SKIP_WAITING"}"#).unwrap();
        assert_eq!(skip, GatewayMessage::SkipWaiting);
        let get: GatewayMessage = serde_json::from_str(r#"{"type":"GET_VERSION"}"#).unwrap();
        assert_eq!(get, GatewayMessage::GetVersion);
        assert!(serde_json::from_str::<GatewayMessage>(r#"{"type":"CLEAR_CACHE"}"#).is_err());

        let reply = serde_json::to_value(MessageReply::Version { version: "10.2.0".into() }).unwrap();
        assert_eq!(reply, serde_json::json!({ "type": "VERSION", "version": "10.2.0" }));
    }

    #[tokio::test]
    async fn test_get_version_replies() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mock = MockNetwork::new();
        let gateway = gateway(&db, &mock, &app_config("10.2.0")).await;

        let (tx, rx) = oneshot::channel();
        gateway.handle_message(GatewayMessage::GetVersion, Some(tx));
        assert_eq!(rx.await.unwrap(), MessageReply::Version { version: "10.2.0".into() });
    }

    #[tokio::test]
    async fn test_get_version_without_channel_is_ignored() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mock = MockNetwork::new();
        let gateway = gateway(&db, &mock, &app_config("10.2.0")).await;

        gateway.handle_message(GatewayMessage::GetVersion, None);
        let (tx, rx) = oneshot::channel();
        drop(rx);
        gateway.handle_message(GatewayMessage::GetVersion, Some(tx));
    }

    #[tokio::test]
    async fn test_skip_waiting_sets_flag() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mock = MockNetwork::new();
        let gateway = gateway(&db, &mock, &app_config("10.2.0")).await;
        assert!(!gateway.status().await.skip_waiting);

        gateway.handle_message(GatewayMessage::SkipWaiting, None);
        let status = gateway.status().await;
        assert!(status.skip_waiting);
        assert_eq!(status.state, super::super::LifecycleState::Installing);
    }
}
