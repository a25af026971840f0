use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use super::error::NotifyError;
use super::event::{NotificationEvent, Recipients};
use super::message::{compose, format_phone};

/// Receives lifecycle events after they are committed.
///
/// Implementations own delivery; the engine only logs what comes back.
pub trait Notifier {
    async fn notify(
        &self,
        event: &NotificationEvent,
        recipients: &Recipients,
    ) -> Result<DeliveryReport, NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub recipient: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliveryReport {
    pub deliveries: Vec<Delivery>,
}

impl DeliveryReport {
    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| !d.success)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendTextRequest<'a> {
    number: String,
    text_message: TextMessage<'a>,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    text: &'a str,
}

/// WhatsApp gateway client for the Evolution API (`/message/sendText`).
pub struct EvolutionClient {
    api_url: String,
    api_key: String,
    instance: String,
    school_name: String,
    client: Client,
}

impl EvolutionClient {
    pub fn new(
        api_url: String,
        api_key: String,
        instance: String,
        school_name: String,
    ) -> Result<Self, NotifyError> {
        if api_url.is_empty() || api_key.is_empty() {
            return Err(NotifyError::NotConfigured);
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            instance,
            school_name,
            client,
        })
    }

    /// Sends one text message. The number is normalized with [`format_phone`].
    pub async fn send_text(&self, phone: &str, text: &str) -> Result<(), NotifyError> {
        let url = format!("{}/message/sendText/{}", self.api_url, self.instance);
        let number = format_phone(phone);
        debug!(%url, %number, "sending WhatsApp message");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&SendTextRequest {
                number,
                text_message: TextMessage { text },
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(NotifyError::Gateway {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

impl Notifier for EvolutionClient {
    async fn notify(
        &self,
        event: &NotificationEvent,
        recipients: &Recipients,
    ) -> Result<DeliveryReport, NotifyError> {
        let mut report = DeliveryReport::default();

        for message in compose(event, recipients, &self.school_name) {
            let outcome = self.send_text(&message.phone, &message.text).await;
            if let Err(e) = &outcome {
                warn!(recipient = %message.recipient, error = %e, "WhatsApp delivery failed");
            }
            report.deliveries.push(Delivery {
                recipient: message.recipient,
                success: outcome.is_ok(),
                error: outcome.err().map(|e| e.to_string()),
            });
        }

        Ok(report)
    }
}
