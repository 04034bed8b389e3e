use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::error::{Result, TouError, DEFAULT_LOAD_ERROR};
use super::model::{
    AcceptanceReceipt, AcceptanceRequest, ApiEnvelope, HistoryEntry, TouRecord,
};
use crate::config::HttpConfig;

/// Thin client over the backend's `/api/tou` endpoints.
#[derive(Debug, Clone)]
pub struct TouClient {
    http: Client,
    api_base: Url,
}

impl TouClient {
    pub fn new(api_base: &str, http: &HttpConfig) -> Result<Self> {
        let api_base = normalize_base(api_base)?;
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
            .timeout(Duration::from_secs(http.read_timeout_secs))
            .build()?;

        Ok(Self { http, api_base })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|e| TouError::InvalidBaseUrl(format!("{}: {}", path, e)))
    }

    /// `GET /api/tou`: the currently active version.
    pub async fn fetch_active(&self) -> Result<TouRecord> {
        let url = self.endpoint("api/tou")?;
        log::info!("[Client] Fetching active TOU from {}", url);
        let res = self.http.get(url).send().await?;
        let record: TouRecord = read_envelope(res).await?;
        log::info!(
            "[Client] Loaded TOU version {:?} ({} sections)",
            record.version,
            record.content.sections.len()
        );
        Ok(record)
    }

    /// `GET /api/tou/version/<n>`
    pub async fn fetch_version(&self, version: i64) -> Result<TouRecord> {
        let url = self.endpoint(&format!("api/tou/version/{}", version))?;
        log::info!("[Client] Fetching TOU version {} from {}", version, url);
        let res = self.http.get(url).send().await?;
        read_envelope(res).await
    }

    /// `GET /api/tou/history`, newest first as the backend orders it.
    pub async fn fetch_history(&self) -> Result<Vec<HistoryEntry>> {
        let url = self.endpoint("api/tou/history")?;
        let res = self.http.get(url).send().await?;
        read_envelope(res).await
    }

    /// `POST /api/tou/accept`. The backend lowercases the address itself.
    pub async fn record_acceptance(&self, email: &str, version: i64) -> Result<AcceptanceReceipt> {
        let url = self.endpoint("api/tou/accept")?;
        log::info!("[Client] Recording acceptance of version {}", version);
        let res = self
            .http
            .post(url)
            .json(&AcceptanceRequest {
                email: email.trim(),
                version,
            })
            .send()
            .await?;
        read_envelope(res).await
    }
}

/// Makes sure relative joins append to the base path instead of replacing
/// its last segment.
fn normalize_base(api_base: &str) -> Result<Url> {
    let trimmed = api_base.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| TouError::InvalidBaseUrl(format!("{}: {}", trimmed, e)))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(TouError::InvalidBaseUrl(trimmed.to_string()));
    }
    Ok(url)
}

// The backend sends a JSON envelope for 4xx/5xx too, so the body decides.
async fn read_envelope<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    let body = res.text().await?;
    log::debug!("[Client] HTTP {} ({} bytes)", status, body.len());
    interpret_envelope(&body)
}

/// Maps a response body onto the envelope's outcome.
pub fn interpret_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body)?;
    match (envelope.ok, envelope.data) {
        (true, Some(data)) => Ok(data),
        (true, None) => Err(TouError::Api(
            envelope.error.unwrap_or_else(|| DEFAULT_LOAD_ERROR.to_string()),
        )),
        (false, _) => {
            let message = envelope
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOAD_ERROR.to_string());
            log::warn!("[Client] API error: {}", message);
            Err(TouError::Api(message))
        }
    }
}
