use crate::config::Settings;
use crate::domain::contract::RawSnapshot;
use crate::source::SnapshotSource;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;

/// Pulls a snapshot document from the platform's export endpoint.
#[derive(Debug, Clone)]
pub struct HttpJsonSource {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    retries: u32,
}

impl HttpJsonSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let url = settings.require_snapshot_url()?.to_string();

        let timeout_secs = std::env::var("SNAPSHOT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("SNAPSHOT_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build snapshot http client")?;

        Ok(Self {
            http,
            url,
            api_key: settings.snapshot_api_key.clone(),
            retries: retries.max(1),
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    async fn fetch_once(&self) -> Result<RawSnapshot> {
        let res = self
            .http
            .get(&self.url)
            .headers(self.headers()?)
            .send()
            .await
            .context("snapshot request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read snapshot response")?;

        if !status.is_success() {
            anyhow::bail!("snapshot source HTTP {status}: {}", truncate(&text, 512));
        }

        serde_json::from_str::<RawSnapshot>(&text)
            .context("failed to parse snapshot response into RawSnapshot")
    }
}

#[async_trait::async_trait]
impl SnapshotSource for HttpJsonSource {
    fn name(&self) -> &'static str {
        "http_json"
    }

    async fn fetch_raw(&self) -> Result<RawSnapshot> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once().await {
                Ok(raw) => return Ok(raw),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = backoff_for(attempt);
                    tracing::warn!(attempt, ?backoff, error = %err, "snapshot fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

fn backoff_for(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt - 1).min(6))
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_for(1), Duration::from_secs(1));
        assert_eq!(backoff_for(2), Duration::from_secs(2));
        assert_eq!(backoff_for(3), Duration::from_secs(4));
        assert_eq!(backoff_for(40), Duration::from_secs(64));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("삼성전자", 2), "삼성");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn requires_url() {
        assert!(HttpJsonSource::from_settings(&Settings::default()).is_err());
    }

    #[test]
    fn sends_api_key_header() {
        let settings = Settings {
            snapshot_url: Some("http://localhost:9000/snapshot".to_string()),
            snapshot_api_key: Some("secret".to_string()),
            ..Settings::default()
        };
        let source = HttpJsonSource::from_settings(&settings).unwrap();
        let headers = source.headers().unwrap();
        assert_eq!(headers.get("x-api-key").unwrap(), "secret");
    }
}
