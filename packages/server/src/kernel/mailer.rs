// Outbound Email Sink Implementations
//
// Email is strictly best-effort: the domain actions spawn sends through
// `send_detached` and never block or fail on delivery.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;

use crate::kernel::traits::BaseMailer;

// =============================================================================
// HTTP Mailer (JSON mail API)
// =============================================================================

/// Sends mail through an HTTP JSON mail API.
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Debug, Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: Option<String>, from: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl BaseMailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let payload = MailPayload {
            from: &self.from,
            to,
            subject,
            text: body,
        };

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("mail API error {}: {}", status, body);
        }

        tracing::info!(to, subject, "notification email sent");
        Ok(())
    }
}

// =============================================================================
// No-op Mailer (no mail API configured)
// =============================================================================

/// Drops mail on the floor, with a debug trace. Used when no mail API is
/// configured and in tests.
pub struct NoopMailer;

#[async_trait]
impl BaseMailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        tracing::debug!(to, subject, "mail sink disabled, dropping email");
        Ok(())
    }
}

// =============================================================================
// Factory function
// =============================================================================

/// Create a mailer based on configuration
pub fn create_mailer(
    api_url: Option<String>,
    api_key: Option<String>,
    from: String,
) -> Arc<dyn BaseMailer> {
    match api_url {
        Some(url) => {
            tracing::info!("email notifications enabled");
            Arc::new(HttpMailer::new(url, api_key, from))
        }
        None => {
            tracing::info!("MAIL_API_URL not set, email notifications disabled");
            Arc::new(NoopMailer)
        }
    }
}

/// Fire-and-forget send. Delivery failures are logged and swallowed; the
/// caller's operation has already succeeded by the time this runs.
pub fn send_detached(mailer: Arc<dyn BaseMailer>, to: String, subject: String, body: String) {
    tokio::spawn(async move {
        if let Err(error) = mailer.send(&to, &subject, &body).await {
            tracing::warn!(%error, to, "notification email failed");
        }
    });
}
