//! Message sender
//!
//! Provider seam for outbound delivery. The dispatcher talks to a
//! [`MessageSender`]; [`HttpSender`] is the production implementation,
//! posting to the sender/tracking service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use leadfactory_core::{FactoryResult, SendError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outbound email, plain text plus the rendered HTML alternative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailPayload {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Outbound WhatsApp message. Plain text only; the channel carries no
/// HTML and providers reject rewritten links.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppPayload {
    pub to_e164: String,
    pub body: String,
}

/// Acknowledgment returned by a provider for one accepted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub ok: bool,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub provider_message_id: Option<String>,
}

/// Delivery provider for outbound messages.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_email(&self, payload: EmailPayload) -> FactoryResult<SendReceipt>;
    async fn send_whatsapp(&self, payload: WhatsAppPayload) -> FactoryResult<SendReceipt>;
}

/// Sender backed by the HTTP sender service.
///
/// Expects `POST {base_url}/send/email` and `POST {base_url}/send/whatsapp`
/// to return a JSON receipt with an `ok` flag.
pub struct HttpSender {
    client: Client,
    base_url: String,
}

impl HttpSender {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn post_receipt<T: Serialize + Sync>(
        &self,
        path: &str,
        payload: &T,
    ) -> FactoryResult<SendReceipt> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(payload).send().await.map_err(|e| {
            SendError::RequestFailed {
                provider: "sender".to_string(),
                status: e.status().map(|s| s.as_u16() as i32).unwrap_or(0),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        let receipt: SendReceipt =
            response
                .json()
                .await
                .map_err(|e| SendError::InvalidResponse {
                    provider: "sender".to_string(),
                    reason: e.to_string(),
                })?;

        if !status.is_success() || !receipt.ok {
            return Err(SendError::RequestFailed {
                provider: receipt.provider.unwrap_or_else(|| "sender".to_string()),
                status: status.as_u16() as i32,
                message: "send rejected".to_string(),
            }
            .into());
        }
        Ok(receipt)
    }
}

#[async_trait]
impl MessageSender for HttpSender {
    async fn send_email(&self, payload: EmailPayload) -> FactoryResult<SendReceipt> {
        self.post_receipt("/send/email", &payload).await
    }

    async fn send_whatsapp(&self, payload: WhatsAppPayload) -> FactoryResult<SendReceipt> {
        self.post_receipt("/send/whatsapp", &payload).await
    }
}
