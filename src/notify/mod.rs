//! Outbound notification email client.
//!
//! Talks to an HTTP email-delivery API. Callers treat delivery as
//! best-effort: failures are logged and the primary operation still
//! reports success.

use std::time::Duration;

use serde::Serialize;

use crate::config::EmailSettings;

/// Request timeout for the delivery API.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_body: &'a str,
}

/// Client for the email delivery HTTP API.
pub struct EmailClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    sender: String,
    notify_email: String,
}

impl EmailClient {
    pub fn new(settings: &EmailSettings) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(SEND_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            sender: settings.sender.clone(),
            notify_email: settings.notify_email.clone(),
        }
    }

    /// Send a plain-text notification to the configured recipient.
    pub async fn notify(&self, subject: &str, body: &str) -> Result<(), reqwest::Error> {
        let request = SendEmailRequest {
            from: &self.sender,
            to: &self.notify_email,
            subject,
            text_body: body,
        };

        self.http
            .post(format!("{}/email", self.api_url))
            .header("X-Server-Token", &self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
