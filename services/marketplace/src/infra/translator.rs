use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::config::MarketplaceConfig;
use crate::domain::repository::Translator;

/// Client for the translation service (`{q, source, target, format}` -> `{translatedText}`).
#[derive(Clone)]
pub struct HttpTranslator {
    pub client: reqwest::Client,
    pub url: String,
    pub timeout: Duration,
    /// Extra attempts after the first failure.
    pub retries: u32,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl HttpTranslator {
    pub fn from_config(client: reqwest::Client, config: &MarketplaceConfig) -> Self {
        Self {
            client,
            url: config.translate_url.clone(),
            timeout: Duration::from_millis(config.translate_timeout_ms),
            retries: config.translate_retries,
        }
    }

    async fn request_once(&self, text: &str, target_lang: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&json!({
                "q": text,
                "source": "auto",
                "target": target_lang,
                "format": "text",
            }))
            .send()
            .await
            .context("send translate request")?
            .error_for_status()
            .context("translate service status")?;
        let body: TranslateResponse = response.json().await.context("decode translate reply")?;
        Ok(body.translated_text)
    }
}

impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> anyhow::Result<String> {
        let mut attempt = 0u32;
        loop {
            match self.request_once(text, target_lang).await {
                Ok(translated) => return Ok(translated),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "translate request failed, retrying");
                    tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
