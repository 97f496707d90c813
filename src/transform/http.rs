//! LibreTranslate-compatible HTTP translator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transform::Translator;

#[derive(Debug, Clone)]
pub struct HttpTranslatorConfig {
    /// Base URL of the service, e.g. `http://localhost:5000` or
    /// `http://host/api/`. `translate` is resolved under its path; a missing
    /// trailing slash is added.
    pub base_url: String,
    pub timeout: Duration,
    pub api_key: Option<String>,
}

impl Default for HttpTranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

pub struct HttpTranslator {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTranslator")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key_set", &self.api_key.is_some())
            .finish()
    }
}

impl HttpTranslator {
    pub fn new(config: HttpTranslatorConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.base_url)
            .and_then(|mut base| {
                if !base.path().ends_with('/') {
                    let path = format!("{}/", base.path());
                    base.set_path(&path);
                }
                base.join("translate")
            })
            .map_err(|e| {
                Error::invalid_config(format!("invalid base URL {:?}: {e}", config.base_url))
            })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("rephrase/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
        })
    }

    /// Resolved `translate` URL requests are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, source: &str, dest: &str) -> Result<String> {
        let body = TranslateRequest {
            q: text,
            source,
            target: dest,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::service(format!("request to {} failed: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::service(format!(
                "{} answered {status} for {source}->{dest}",
                self.endpoint
            )));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| Error::service(format!("malformed translation response: {e}")))?;
        Ok(parsed.translated_text)
    }
}
