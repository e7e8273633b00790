use crate::api::errors::ApiError;
use crate::api::types::Envelope;
use crate::config::ApiConfig;
use crate::observability::api_metrics;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};

/// Whether a request must carry the operator's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Anonymous,
    Bearer,
}

/// Rate-limited REST client for the roastery backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl ApiClient {
    pub fn new(settings: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&settings.base_url)?;

        let per_second =
            NonZeroU32::new(settings.rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(settings.rate_limit.burst_capacity).unwrap_or(per_second);
        let rate_limiter = Arc::new(RateLimiter::direct(
            Quota::per_second(per_second).allow_burst(burst),
        ));

        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("roastery-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            token: None,
            rate_limiter,
        })
    }

    /// Attach the bearer token used for every authenticated endpoint.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidRequest(format!("bad endpoint '{path}': {e}")))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?.query(query);
        self.send(request, Auth::Bearer).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(method, path)?.json(body);
        self.send(request, auth).await
    }

    /// Send and unwrap the `data` field of the response envelope.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let body = self.execute(request, auth).await?;
        decode_envelope(&body)
    }

    /// Send and discard the body, for endpoints that only signal success.
    pub(crate) async fn send_unit(&self, request: RequestBuilder, auth: Auth) -> Result<(), ApiError> {
        self.execute(request, auth).await.map(|_| ())
    }

    async fn execute(&self, request: RequestBuilder, auth: Auth) -> Result<String, ApiError> {
        let request = match auth {
            Auth::Anonymous => request,
            Auth::Bearer => {
                let token = self.token.as_deref().ok_or(ApiError::NotAuthenticated)?;
                request.bearer_auth(token)
            }
        };

        self.rate_limiter.until_ready().await;
        api_metrics().record_request();

        let response = request.send().await.map_err(|e| {
            api_metrics().record_error();
            warn!(error = %e, "Request did not reach the API");
            ApiError::from(e)
        })?;

        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            api_metrics().record_error();
            let message = error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            warn!(status = status.as_u16(), url = %url, message = %message, "API returned an error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), url = %url, "API request succeeded");
        Ok(body)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    // Url::join drops the last path segment unless the base ends in '/'
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| ApiError::InvalidRequest(format!("invalid API base URL '{raw}': {e}")))
}

pub(crate) fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    match envelope.data {
        Some(data) => Ok(data),
        None => Err(ApiError::Decode(
            envelope
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "response envelope has no data".to_string()),
        )),
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .filter(|message| !message.is_empty())
}
