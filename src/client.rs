use std::env;
use std::time::{Duration, Instant};

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use url::Url;

use crate::backend::GenerativeBackend;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, CLIENT_UNAUTHENTICATED,
};
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Client for the Gemini generative-language API.
#[derive(Debug, Clone)]
pub struct Gemini {
    api_key: Option<String>,
    client: ReqwestClient,
    base_url: Url,
    timeout: Duration,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the `GEMINI_API_KEY`
    /// or `API_KEY` environment variables. A missing key is not an error here:
    /// every request made without one fails with an authentication error.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = api_key.or_else(api_key_from_env);
        if api_key.is_none() {
            log::warn!(
                "no API key provided and none of {} set; replies will fall back",
                API_KEY_ENV_VARS.join(", ")
            );
        }

        let base_url = parse_base_url(base_url.as_deref().unwrap_or(DEFAULT_API_URL))?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
        })
    }

    /// Returns true if the client holds an API key.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The endpoint that generates content for `model`.
    fn endpoint(&self, model: &Model) -> Result<Url> {
        let model = model.to_string();
        let model = model.strip_prefix("models/").unwrap_or(&model);
        Ok(self
            .base_url
            .join(&format!("models/{model}:generateContent"))?)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::authentication(format!(
                "API key not provided and none of {} set",
                API_KEY_ENV_VARS.join(", ")
            )));
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| Error::authentication("API key contains invalid header characters"))?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        match response.text().await {
            Ok(body) => error_from_body(status_code, retry_after, &body),
            Err(e) => Error::http_client(
                format!("Failed to read error response: {}", e),
                Some(Box::new(e)),
            ),
        }
    }

    /// Send a request to the API and get a non-streaming response.
    pub async fn generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let headers = match self.default_headers() {
            Ok(headers) => headers,
            Err(err) => {
                CLIENT_UNAUTHENTICATED.click();
                return Err(err);
            }
        };
        let url = self.endpoint(model)?;

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        log::debug!("generateContent model={model} turns={}", request.contents.len());
        let result = self.post(url, headers, request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            CLIENT_REQUEST_ERRORS.click();
            log::debug!("generateContent failed: {err}");
        }
        result
    }

    async fn post(
        &self,
        url: Url,
        headers: HeaderMap,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(
                        format!("Request timed out: {}", e),
                        Some(self.timeout.as_secs_f64()),
                    )
                } else if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| {
                Error::serialization(
                    format!("Failed to parse response: {}", e),
                    Some(Box::new(e)),
                )
            })
    }
}

#[async_trait::async_trait]
impl GenerativeBackend for Gemini {
    async fn generate_content(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        Gemini::generate_content(self, model, request).await
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|key| !key.trim().is_empty())
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    // Url::join drops the last path segment unless the base ends with a slash.
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{base_url}/"))?)
    }
}

/// Map an error status and body to our Error type.
///
/// Gemini reports errors as `{"error": {"code", "message", "status"}}`; a
/// body in any other shape is used verbatim as the message.
fn error_from_body(status_code: u16, retry_after: Option<u64>, body: &str) -> Error {
    #[derive(Deserialize)]
    struct ErrorResponse {
        error: Option<ErrorDetail>,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
        status: Option<String>,
    }

    let detail = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error);
    let status = detail.as_ref().and_then(|d| d.status.clone());
    let message = detail
        .and_then(|d| d.message)
        .unwrap_or_else(|| body.to_string());

    match status_code {
        400 => Error::bad_request(message),
        401 => Error::authentication(message),
        403 => Error::permission(message),
        404 => Error::not_found(message),
        408 => Error::timeout(message, None),
        429 => Error::rate_limit(message, retry_after),
        500 => Error::internal_server(message),
        502..=504 => Error::service_unavailable(message, retry_after),
        _ => Error::api(status_code, status, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, KnownModel};

    #[test]
    fn client_creation() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key.as_deref(), Some("test-key"));
        assert_eq!(client.base_url.as_str(), DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = Gemini::with_options(
            Some("test-key".to_string()),
            Some("https://proxy.example.com/gemini".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url.as_str(), "https://proxy.example.com/gemini/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = Gemini::with_options(Some("k".to_string()), Some("not a url".to_string()), None)
            .unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn endpoint_for_model() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        let url = client
            .endpoint(&Model::Known(KnownModel::Gemini3FlashPreview))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
        let url = client.endpoint(&Model::from("models/tuned-1")).unwrap();
        assert!(url.as_str().ends_with("/models/tuned-1:generateContent"));
    }

    #[test]
    fn api_key_goes_in_header_not_url() {
        let client = Gemini::new(Some("secret".to_string())).unwrap();
        let headers = client.default_headers().unwrap();
        assert_eq!(headers.get("x-goog-api-key").unwrap(), "secret");
        let url = client.endpoint(&Model::default()).unwrap();
        assert!(!url.as_str().contains("secret"));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = Gemini {
            api_key: None,
            client: ReqwestClient::new(),
            // Unroutable on purpose: the request must never be sent.
            base_url: Url::parse("http://127.0.0.1:9/").unwrap(),
            timeout: DEFAULT_TIMEOUT,
        };
        let request = GenerateContentRequest {
            contents: vec![Content::user("hello")],
            ..Default::default()
        };
        let err = client
            .generate_content(&Model::default(), &request)
            .await
            .unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn error_mapping_uses_body_message() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}}"#;
        match error_from_body(429, Some(12), body) {
            Error::RateLimit {
                message,
                retry_after,
            } => {
                assert_eq!(message, "Resource has been exhausted");
                assert_eq!(retry_after, Some(12));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            error_from_body(400, None, body),
            Error::BadRequest { message } if message == "API key not valid."
        ));
    }

    #[test]
    fn error_mapping_by_status() {
        assert!(error_from_body(401, None, "").is_authentication());
        assert!(matches!(
            error_from_body(403, None, ""),
            Error::Permission { .. }
        ));
        assert!(matches!(error_from_body(404, None, ""), Error::NotFound { .. }));
        assert!(error_from_body(500, None, "").is_server_error());
        assert!(error_from_body(503, None, "").is_server_error());
        let err = error_from_body(
            409,
            None,
            r#"{"error": {"message": "busy", "status": "ABORTED"}}"#,
        );
        assert_eq!(err.status_code(), Some(409));
        assert_eq!(err.to_string(), "API error 409 (ABORTED): busy");
    }

    #[test]
    fn error_mapping_with_plain_body() {
        assert!(matches!(
            error_from_body(502, None, "<html>bad gateway</html>"),
            Error::ServiceUnavailable { message, .. } if message == "<html>bad gateway</html>"
        ));
    }

    #[tokio::test]
    #[ignore] // Ignore by default as this requires a real API key
    async fn live_generate_content() {
        let Some(api_key) = api_key_from_env() else {
            println!("Skipping live_generate_content: no API key set");
            return;
        };
        let client = Gemini::new(Some(api_key)).unwrap();
        let request = GenerateContentRequest {
            contents: vec![Content::user("Reply with a short greeting.")],
            ..Default::default()
        };
        let response = client
            .generate_content(&Model::Known(KnownModel::Gemini25Flash), &request)
            .await
            .unwrap();
        assert!(response.text().is_some());
    }
}
