use crate::domain::model::ApiErrorBody;
use crate::domain::ports::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::utils::error::{PostmarkError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const API_TOKEN_HEADER: &str = "X-Postmark-Server-Token";

const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (Rust)"
);

/// 同步 Postmark REST 客戶端，每次呼叫對應一個阻塞式 HTTP 請求
#[derive(Debug, Clone)]
pub struct PostmarkClient {
    client: Client,
    base_url: String,
}

impl PostmarkClient {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_options(
            api_key,
            DEFAULT_API_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    pub fn with_options(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        // reqwest 會把零秒當成立即逾時
        if timeout.is_zero() {
            return Err(PostmarkError::InvalidConfigValueError {
                field: "timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let token = HeaderValue::from_str(api_key).map_err(|_| {
            PostmarkError::InvalidConfigValueError {
                field: "api_key".to_string(),
                value: "<redacted>".to_string(),
                reason: "API key contains characters not allowed in an HTTP header".to_string(),
            }
        })?;
        headers.insert(API_TOKEN_HEADER, token);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_string(body)?;
        tracing::debug!("POST {} ({} bytes)", self.url(path), payload.len());
        self.execute(self.client.post(self.url(path)).body(payload))
    }

    pub fn get_json<R>(&self, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        tracing::debug!("GET {}", self.url(path));
        self.execute(self.client.get(self.url(path)))
    }

    pub fn get_json_with_query<Q, R>(&self, path: &str, query: &Q) -> Result<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!("GET {} with query", self.url(path));
        self.execute(self.client.get(self.url(path)).query(query))
    }

    pub fn put_json<R>(&self, path: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        tracing::debug!("PUT {}", self.url(path));
        self.execute(self.client.put(self.url(path)).body("{}"))
    }

    fn execute<R>(&self, request: RequestBuilder) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        tracing::debug!("Postmark response status: {}", status);

        if status.is_success() {
            Ok(serde_json::from_str(&body)?)
        } else {
            let error = map_error_response(status, &body);
            tracing::warn!("Postmark request failed ({}): {}", status, error);
            Err(error)
        }
    }
}

/// 將失敗的 HTTP 回應轉成對應的錯誤類型
pub fn map_error_response(status: StatusCode, body: &str) -> PostmarkError {
    match status.as_u16() {
        401 => PostmarkError::Unauthorized,
        406 => PostmarkError::InactiveRecipient {
            message: parse_error_body(body)
                .map(|e| e.message)
                .unwrap_or_default(),
        },
        422 => match parse_error_body(body) {
            Some(error) if error.error_code == 406 => PostmarkError::InactiveRecipient {
                message: error.message,
            },
            Some(error) => PostmarkError::UnprocessableEntity {
                message: error.message,
            },
            None => PostmarkError::UnprocessableEntity {
                message: "Description not given".to_string(),
            },
        },
        500 => PostmarkError::ServerError {
            message: parse_error_body(body)
                .map(|e| e.message)
                .unwrap_or_default(),
        },
        code => PostmarkError::SendError {
            status: code,
            message: parse_error_body(body)
                .map(|e| e.message)
                .unwrap_or_else(|| body.to_string()),
        },
    }
}

fn parse_error_body(body: &str) -> Option<ApiErrorBody> {
    serde_json::from_str(body).ok()
}
