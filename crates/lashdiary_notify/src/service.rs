// --- File: crates/lashdiary_notify/src/service.rs ---
//! Zoho Mail notification service implementation.
//!
//! Confirmation and owner-notification emails go out through the Zoho
//! Mail HTTP API. The booking pipeline calls this best-effort; a failed
//! send is retried by the caller and eventually dropped with a log line,
//! never surfaced to the client.

use lashdiary_common::services::{EmailAttachment, NotificationResult, NotificationService};
use lashdiary_config::AppConfig;
use reqwest::Client;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Env var holding the Zoho OAuth token. Read at send time so a rotated
/// token takes effect without a restart.
const ZOHO_TOKEN_ENV: &str = "ZOHO_MAIL_TOKEN";

/// Zoho-specific error types.
#[derive(Error, Debug)]
pub enum ZohoError {
    /// Error occurred during a Zoho API request
    #[error("Zoho API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Zoho API
    #[error("Zoho API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Missing or incomplete notifier configuration
    #[error("Notifier configuration missing or incomplete")]
    ConfigError,

    /// The OAuth token env var is not set
    #[error("ZOHO_MAIL_TOKEN is not set")]
    MissingToken,
}

/// Zoho Mail notification service implementation.
pub struct ZohoNotificationService {
    config: Arc<AppConfig>,
    client: Client,
}

impl ZohoNotificationService {
    /// Create a new Zoho notification service.
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

/// The Zoho send-mail payload for one message.
fn build_payload(
    from_address: &str,
    to: &str,
    subject: &str,
    html_body: &str,
    attachments: &[EmailAttachment],
) -> serde_json::Value {
    let mut payload = json!({
        "fromAddress": from_address,
        "toAddress": to,
        "subject": subject,
        "content": html_body,
        "mailFormat": "html",
    });
    if !attachments.is_empty() {
        payload["attachments"] = attachments
            .iter()
            .map(|a| {
                json!({
                    "attachmentName": a.filename,
                    "contentType": a.mime_type,
                    "content": a.content_base64,
                })
            })
            .collect();
    }
    payload
}

impl NotificationService for ZohoNotificationService {
    type Error = ZohoError;

    fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        attachments: &[EmailAttachment],
    ) -> Pin<Box<dyn Future<Output = Result<NotificationResult, Self::Error>> + Send + '_>> {
        // Clone the values to avoid lifetime issues
        let to = to.to_string();
        let subject = subject.to_string();
        let html_body = html_body.to_string();
        let attachments = attachments.to_vec();

        Box::pin(async move {
            let notifier_config = self.config.notifier.as_ref().ok_or(ZohoError::ConfigError)?;
            let token = std::env::var(ZOHO_TOKEN_ENV).map_err(|_| ZohoError::MissingToken)?;

            let url = format!(
                "{}/accounts/{}/messages",
                notifier_config.api_base.trim_end_matches('/'),
                notifier_config.account_id
            );
            let payload = build_payload(
                &notifier_config.from_address,
                &to,
                &subject,
                &html_body,
                &attachments,
            );

            info!("Sending email to {}: {}", to, subject);
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Zoho-oauthtoken {token}"))
                .json(&payload)
                .send()
                .await?;

            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();

            if !status.is_success() {
                tracing::error!("Zoho returned {}: {}", status, body);
                return Err(ZohoError::ApiError {
                    status_code: status.as_u16(),
                    message: body.to_string(),
                });
            }

            let message_id = body
                .pointer("/data/messageId")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(NotificationResult {
                id: message_id,
                status: "sent".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_html_content_and_addresses() {
        let payload = build_payload(
            "labs@lashdiary.co.ke",
            "a@example.com",
            "Your showcase meeting",
            "<p>Hi</p>",
            &[],
        );
        assert_eq!(payload["fromAddress"], "labs@lashdiary.co.ke");
        assert_eq!(payload["toAddress"], "a@example.com");
        assert_eq!(payload["mailFormat"], "html");
        assert!(payload.get("attachments").is_none());
    }

    #[test]
    fn attachments_are_inlined_base64() {
        let attachment = EmailAttachment {
            filename: "invoice.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            content_base64: "aGVsbG8=".to_string(),
        };
        let payload = build_payload("from@x", "to@x", "s", "<p/>", &[attachment]);
        let attachments = payload["attachments"].as_array().unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0]["attachmentName"], "invoice.pdf");
        assert_eq!(attachments[0]["content"], "aGVsbG8=");
    }
}
