use anyhow::Context as _;
use serde_json::json;
use tracing::info;

use crate::config::MarketplaceConfig;
use crate::domain::repository::Mailer;
use crate::domain::types::MailMessage;

/// Mail transport posting JSON to an HTTP mail provider.
///
/// Without `MAIL_API_URL` messages are only logged, which keeps local development and
/// tests free of a provider account.
#[derive(Clone)]
pub struct HttpMailer {
    pub client: reqwest::Client,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    /// `"Name <address>"` sender header.
    pub from: String,
}

impl HttpMailer {
    pub fn from_config(client: reqwest::Client, config: &MarketplaceConfig) -> Self {
        Self {
            client,
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: format!("{} <{}>", config.mail_from_name, config.mail_from),
        }
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        let Some(url) = self.api_url.as_deref() else {
            info!(to = ?message.to, subject = %message.subject, "mail provider not configured, email logged only");
            return Ok(());
        };

        let mut request = self.client.post(url).json(&json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "html": message.html,
        }));
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("send mail request")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("mail provider returned {status}: {body}");
        }
        Ok(())
    }
}
