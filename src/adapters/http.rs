use crate::domain::model::{AuthResponse, Credentials, Order, Profile, Registration, SessionToken};
use crate::domain::ports::BackendApi;
use crate::utils::error::{Result, SmokeError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const ME_PATH: &str = "/api/auth/me";
pub const PENDING_ORDERS_PATH: &str = "/api/orders/pending";

pub const AUTH_HEADER: &str = "x-auth-token";

/// 以 reqwest 實作的後端客戶端
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("backend-smoke/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!("📡 {}", path);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("📡 {} -> {}", path, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("⚠️ Failed to read error body from {}: {}", path, e);
                String::new()
            }
        };
        Err(SmokeError::HttpStatus {
            endpoint: path.to_string(),
            status: status.as_u16(),
            message: extract_error_message(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SmokeError::UnexpectedResponse {
            endpoint: path.to_string(),
            message: format!("{} (body: {})", e, truncate(&body, 200)),
        })
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let request = self.client.post(self.url(LOGIN_PATH)).json(credentials);
        let response = self.send(LOGIN_PATH, request).await?;
        Self::decode(LOGIN_PATH, response).await
    }

    async fn pending_orders(&self, token: &SessionToken) -> Result<Vec<Order>> {
        let request = self
            .client
            .get(self.url(PENDING_ORDERS_PATH))
            .header(AUTH_HEADER, token.as_str());
        let response = self.send(PENDING_ORDERS_PATH, request).await?;
        let json: serde_json::Value = Self::decode(PENDING_ORDERS_PATH, response).await?;

        let items = match json {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(SmokeError::UnexpectedResponse {
                    endpoint: PENDING_ORDERS_PATH.to_string(),
                    message: format!("expected an array of orders, got {}", json_kind(&other)),
                })
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                serde_json::Value::Object(obj) => Ok(Order(obj)),
                other => Err(SmokeError::UnexpectedResponse {
                    endpoint: PENDING_ORDERS_PATH.to_string(),
                    message: format!("order #{} is {}, not an object", index, json_kind(&other)),
                }),
            })
            .collect()
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        let request = self.client.post(self.url(REGISTER_PATH)).json(registration);
        let response = self.send(REGISTER_PATH, request).await?;
        Self::decode(REGISTER_PATH, response).await
    }

    async fn me(&self, token: &SessionToken) -> Result<Profile> {
        let request = self
            .client
            .get(self.url(ME_PATH))
            .header(AUTH_HEADER, token.as_str());
        let response = self.send(ME_PATH, request).await?;
        Self::decode(ME_PATH, response).await
    }
}

/// 從錯誤回應中取出可讀訊息
///
/// 依序嘗試 `msg`、`message`、`error` 以及 express-validator 風格的 `errors[0].msg`，
/// 都沒有時回傳原始 body。
pub fn extract_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(serde_json::Value::Object(obj)) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["msg", "message", "error"] {
            if let Some(serde_json::Value::String(message)) = obj.get(key) {
                return message.clone();
            }
        }

        if let Some(message) = obj
            .get("errors")
            .and_then(|errors| errors.get(0))
            .and_then(|first| first.get("msg"))
            .and_then(|msg| msg.as_str())
        {
            return message.to_string();
        }
    }

    truncate(trimmed, 200)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}…", head)
    }
}
