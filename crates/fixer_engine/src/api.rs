use std::time::Duration;

use fixer_core::{
    ActiveTasksResponse, CancelRequest, CancelResponse, FixRequest, FixResponse, StartRequest,
    StartResponse,
};
use fixer_logging::{fixer_info, fixer_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

const FIX_ENDPOINT: &str = "model_path_fixer/fix";
const ACTIVE_TASKS_ENDPOINT: &str = "model_path_fixer/active_tasks";
const DOWNLOAD_ENDPOINT: &str = "model_path_fixer/download";
const CANCEL_ENDPOINT: &str = "model_path_fixer/cancel";

pub const DEFAULT_SOURCE: &str = "HF Mirror";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Mirror the server downloads from.
    pub source: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8188".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// The four server operations the fixer needs.
///
/// Implementations never fail: transport problems come back as an empty
/// result or a failure object.
#[async_trait::async_trait]
pub trait FixerApi: Send + Sync {
    async fn fix_paths(&self, request: &FixRequest) -> FixResponse;
    async fn active_tasks(&self) -> Vec<String>;
    async fn start_download(&self, url: &str, filename: &str, model_type: &str) -> StartResponse;
    async fn cancel_download(&self, filename: &str) -> CancelResponse;
}

#[derive(Debug, Clone)]
pub struct HttpFixerApi {
    client: reqwest::Client,
    base: Url,
    source: String,
}

impl HttpFixerApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = parse_base(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base,
            source: settings.source,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn try_fix_paths(&self, request: &FixRequest) -> Result<FixResponse, ApiError> {
        self.post_json(FIX_ENDPOINT, request).await
    }

    pub async fn try_active_tasks(&self) -> Result<Vec<String>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(ACTIVE_TASKS_ENDPOINT)?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: ActiveTasksResponse = read_json(response).await?;
        Ok(body.active)
    }

    pub async fn try_start_download(
        &self,
        url: &str,
        filename: &str,
        model_type: &str,
    ) -> Result<StartResponse, ApiError> {
        let request = StartRequest {
            url: url.to_string(),
            filename: filename.to_string(),
            model_type: model_type.to_string(),
            source: self.source.clone(),
        };
        fixer_info!("Requesting download of {} into {}", filename, model_type);
        self.post_json(DOWNLOAD_ENDPOINT, &request).await
    }

    pub async fn try_cancel_download(&self, filename: &str) -> Result<CancelResponse, ApiError> {
        fixer_info!("Requesting cancel of {}", filename);
        let request = CancelRequest {
            filename: filename.to_string(),
        };
        self.post_json(CANCEL_ENDPOINT, &request).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }
}

#[async_trait::async_trait]
impl FixerApi for HttpFixerApi {
    async fn fix_paths(&self, request: &FixRequest) -> FixResponse {
        match self.try_fix_paths(request).await {
            Ok(response) => response,
            Err(err) => {
                fixer_warn!("Fix request failed: {}", err);
                FixResponse::default()
            }
        }
    }

    async fn active_tasks(&self) -> Vec<String> {
        match self.try_active_tasks().await {
            Ok(active) => active,
            Err(err) => {
                fixer_warn!("Active task query failed: {}", err);
                Vec::new()
            }
        }
    }

    async fn start_download(&self, url: &str, filename: &str, model_type: &str) -> StartResponse {
        match self.try_start_download(url, filename, model_type).await {
            Ok(response) => {
                fixer_info!(
                    "Start of {}: success={} status={:?}",
                    filename,
                    response.success,
                    response.status
                );
                response
            }
            Err(err) => {
                fixer_warn!("Start request for {} failed: {}", filename, err);
                StartResponse::failure(err.to_string())
            }
        }
    }

    async fn cancel_download(&self, filename: &str) -> CancelResponse {
        match self.try_cancel_download(filename).await {
            Ok(response) => {
                fixer_info!("Cancel of {}: success={}", filename, response.success);
                response
            }
            Err(err) => {
                fixer_warn!("Cancel request for {} failed: {}", filename, err);
                CancelResponse::failure(err.to_string())
            }
        }
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    // `join` drops the last path segment unless the base ends with a slash.
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidUrl(format!("unsupported scheme {other}"))),
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::HttpStatus(status.as_u16()));
    }
    response.json::<T>().await.map_err(map_reqwest_error)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(err.to_string());
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
