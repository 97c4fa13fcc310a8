use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::protocol::ServerEvent;

struct ConnectionHandle {
    user_id: Option<String>,
    tx: UnboundedSender<String>,
}

/// Live WebSocket connections: connection id to outbound sender, plus the
/// user the connection has identified itself as (set on the first queue or
/// battle action).
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<String, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, connection_id: &str, tx: UnboundedSender<String>) {
        self.connections
            .lock()
            .unwrap()
            .insert(connection_id.to_string(), ConnectionHandle { user_id: None, tx });
    }

    pub fn set_user(&self, connection_id: &str, user_id: &str) {
        if let Some(handle) = self.connections.lock().unwrap().get_mut(connection_id) {
            handle.user_id = Some(user_id.to_string());
        }
    }

    pub fn user_of(&self, connection_id: &str) -> Option<String> {
        self.connections
            .lock()
            .unwrap()
            .get(connection_id)
            .and_then(|handle| handle.user_id.clone())
    }

    /// Drops the connection and returns the user it was bound to, if any.
    pub fn remove(&self, connection_id: &str) -> Option<String> {
        self.connections
            .lock()
            .unwrap()
            .remove(connection_id)
            .and_then(|handle| handle.user_id)
    }

    pub fn send(&self, connection_id: &str, event: &ServerEvent) -> bool {
        let connections = self.connections.lock().unwrap();
        let Some(handle) = connections.get(connection_id) else {
            debug!("Dropping event for unknown connection {}", connection_id);
            return false;
        };
        match serde_json::to_string(event) {
            Ok(json) => handle.tx.send(json).is_ok(),
            Err(err) => {
                warn!("Failed to serialize event: {}", err);
                false
            }
        }
    }

    /// Sends to the most recent connection identified as `user_id`.
    pub fn send_to_user(&self, user_id: &str, event: &ServerEvent) -> bool {
        let connections = self.connections.lock().unwrap();
        let Some(handle) = connections
            .values()
            .find(|handle| handle.user_id.as_deref() == Some(user_id))
        else {
            debug!("No live connection for user {}", user_id);
            return false;
        };
        match serde_json::to_string(event) {
            Ok(json) => handle.tx.send(json).is_ok(),
            Err(err) => {
                warn!("Failed to serialize event: {}", err);
                false
            }
        }
    }

    pub fn broadcast(&self, event: &ServerEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(err) => {
                warn!("Failed to serialize broadcast event: {}", err);
                return;
            }
        };
        for handle in self.connections.lock().unwrap().values() {
            let _ = handle.tx.send(json.clone());
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().unwrap().len()
    }
}
