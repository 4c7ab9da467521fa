mod fcm;

pub use fcm::FcmPushService;

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;

/// The notification part of a push message as the push API expects it
#[derive(Debug, Clone, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

/// A message addressed to a single registered device token
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub token: String,
    pub notification: PushNotification,
}

#[async_trait::async_trait]
pub trait IPushService: Send + Sync {
    async fn send(&self, message: &PushMessage) -> anyhow::Result<()>;
}

/// Push service that only records what was sent. Used in tests to assert on
/// delivery counts and to inject send failures for specific tokens.
pub struct InMemoryPushService {
    sent: Mutex<Vec<PushMessage>>,
    rejected_tokens: Mutex<HashSet<String>>,
}

impl InMemoryPushService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            rejected_tokens: Mutex::new(HashSet::new()),
        }
    }

    /// Makes every send to `token` fail until further notice
    pub fn reject_token(&self, token: &str) {
        self.rejected_tokens
            .lock()
            .unwrap()
            .insert(token.to_string());
    }

    pub fn sent_messages(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for InMemoryPushService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IPushService for InMemoryPushService {
    async fn send(&self, message: &PushMessage) -> anyhow::Result<()> {
        if self.rejected_tokens.lock().unwrap().contains(&message.token) {
            return Err(anyhow::anyhow!(
                "Push service rejected token: {}",
                message.token
            ));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
