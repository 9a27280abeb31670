//! Discord webhook sink (REST, no SDK dependency)

use async_trait::async_trait;
use serde::Serialize;
use shared::models::OrderStatus;

use super::{Attachment, Channel, Notification, NotificationSink};

const COLOR_SUBMITTED: u32 = 0xa855f7;
const COLOR_COMPLETED: u32 = 0x10b981;
const COLOR_REJECTED: u32 = 0xef4444;
const COLOR_CONTACT: u32 = 0x3b82f6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Body of one webhook execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

fn field(name: &str, value: &str, inline: bool) -> EmbedField {
    // Discord rejects empty field values
    let value = if value.trim().is_empty() { "N/A" } else { value };
    EmbedField {
        name: name.to_string(),
        value: value.to_string(),
        inline,
    }
}

fn rfc3339(millis: i64) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(millis).map(|t| t.to_rfc3339())
}

fn status_color(status: OrderStatus) -> u32 {
    match status {
        OrderStatus::Completed => COLOR_COMPLETED,
        OrderStatus::Rejected => COLOR_REJECTED,
        OrderStatus::Pending | OrderStatus::Processing => COLOR_SUBMITTED,
    }
}

/// Render an event into its channel and message
pub fn render(notification: &Notification) -> (Channel, WebhookMessage) {
    let message = match notification {
        Notification::Submitted { order, .. } => WebhookMessage {
            content: None,
            embeds: vec![Embed {
                title: "💳 New Payment Proof Submitted".into(),
                color: COLOR_SUBMITTED,
                fields: vec![
                    field("Order ID", &order.order_id, true),
                    field("IMVU ID", &order.imvu_id, true),
                    field("Email", &order.email, false),
                    field("Product", &order.product_name, false),
                    field("Payment Method", &order.payment_method, true),
                    field(
                        "Transaction ID",
                        order.transaction_id.as_deref().unwrap_or_default(),
                        true,
                    ),
                    field("Status", "Pending Verification", false),
                ],
                timestamp: rfc3339(order.created_at),
            }],
        },
        Notification::StatusChanged { order } => WebhookMessage {
            content: Some("📦 **Order Status Updated**".into()),
            embeds: vec![Embed {
                title: format!("Order {}", order.order_id),
                color: status_color(order.status),
                fields: vec![
                    field("Order ID", &order.order_id, true),
                    field("Status", &order.status.as_str().to_uppercase(), true),
                    field("Product", &order.product_name, false),
                    field("IMVU ID", &order.imvu_id, true),
                    field("Email", &order.email, true),
                    field("Message", order.status.message(), false),
                ],
                timestamp: rfc3339(order.updated_at),
            }],
        },
        Notification::ContactSubmitted { message } => WebhookMessage {
            content: Some("📬 **New Contact Form Submission**".into()),
            embeds: vec![Embed {
                title: "Contact Form".into(),
                color: COLOR_CONTACT,
                fields: vec![
                    field("Name", &message.name, true),
                    field("Email", &message.email, true),
                    field("IMVU Username", &message.imvu_username, false),
                    field("Message", &message.message, false),
                ],
                timestamp: rfc3339(message.created_at),
            }],
        },
    };
    (notification.channel(), message)
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Posts rendered events to the two configured webhook URLs
pub struct DiscordWebhook {
    client: reqwest::Client,
    payment_url: String,
    status_url: String,
}

impl DiscordWebhook {
    pub fn new(payment_url: impl Into<String>, status_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            payment_url: payment_url.into(),
            status_url: status_url.into(),
        }
    }

    fn url_for(&self, channel: Channel) -> &str {
        match channel {
            Channel::Payment => &self.payment_url,
            Channel::Status => &self.status_url,
        }
    }

    async fn send(
        &self,
        url: &str,
        message: &WebhookMessage,
        attachment: Option<&Attachment>,
    ) -> Result<(), BoxError> {
        let request = match attachment {
            Some(file) => {
                let mut part = reqwest::multipart::Part::bytes(file.bytes.clone())
                    .file_name(file.filename.clone());
                if let Some(mime) = &file.content_type {
                    part = part.mime_str(mime)?;
                }
                let form = reqwest::multipart::Form::new()
                    .text("payload_json", serde_json::to_string(message)?)
                    .part("file", part);
                self.client.post(url).multipart(form)
            }
            None => self.client.post(url).json(message),
        };

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("webhook returned {status}: {body}").into());
        }
        Ok(())
    }

    /// Render and post one event; `Ok(false)` when its channel has no URL
    pub async fn dispatch(&self, notification: &Notification) -> Result<bool, BoxError> {
        let (channel, message) = render(notification);
        let url = self.url_for(channel);
        if url.is_empty() {
            tracing::debug!(?channel, "Webhook URL not configured, skipping");
            return Ok(false);
        }

        let attachment = match notification {
            Notification::Submitted { attachment, .. } => attachment.as_ref(),
            _ => None,
        };
        self.send(url, &message, attachment).await?;
        Ok(true)
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    async fn deliver(&self, notification: Notification) {
        let channel = notification.channel();
        if let Err(e) = self.dispatch(&notification).await {
            tracing::warn!(?channel, error = %e, "Discord webhook failed");
        }
    }
}
