use super::{IPushService, PushMessage, PushNotification};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

// https://firebase.google.com/docs/cloud-messaging/http-server-ref
#[derive(Debug, Serialize)]
struct FcmSendRequest<'a> {
    to: &'a str,
    notification: &'a PushNotification,
}

#[derive(Debug, Deserialize)]
struct FcmSendResponse {
    success: i64,
    failure: i64,
}

/// Push service backed by the FCM HTTP API, authorized with a server key
pub struct FcmPushService {
    client: Client,
    server_key: String,
}

impl FcmPushService {
    pub fn new(server_key: String) -> Self {
        Self {
            client: Client::new(),
            server_key,
        }
    }
}

#[async_trait::async_trait]
impl IPushService for FcmPushService {
    async fn send(&self, message: &PushMessage) -> anyhow::Result<()> {
        let body = FcmSendRequest {
            to: &message.token,
            notification: &message.notification,
        };

        let res = match self
            .client
            .post(FCM_SEND_URL)
            .header("authorization", format!("key={}", self.server_key))
            .json(&body)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                error!("[Network Error] FCM send error. Error message: {:?}", e);
                return Err(anyhow::Error::new(e));
            }
        };

        if !res.status().is_success() {
            let status = res.status();
            error!("[Unexpected Response] FCM send failed with status: {}", status);
            return Err(anyhow::anyhow!("FCM send failed with status: {}", status));
        }

        let res = res.json::<FcmSendResponse>().await?;
        if res.failure > 0 {
            return Err(anyhow::anyhow!(
                "FCM rejected the message. Success count: {}, failure count: {}",
                res.success,
                res.failure
            ));
        }

        Ok(())
    }
}
