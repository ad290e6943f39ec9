use crate::domain::model::{AuthResponse, Credentials, Order, Profile, Registration, SessionToken};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// 後端 HTTP 介面
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;
    async fn pending_orders(&self, token: &SessionToken) -> Result<Vec<Order>>;
    async fn register(&self, registration: &Registration) -> Result<AuthResponse>;
    async fn me(&self, token: &SessionToken) -> Result<Profile>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMethod {
    /// 透過 SQL driver 連線並執行 `SELECT 1`
    SqlQuery,
    /// 透過 MongoDB driver 連線並執行 `ping` 指令
    MongoPing,
    /// 只確認 host:port 可以建立 TCP 連線
    TcpConnect,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub target: String,
    pub method: ProbeMethod,
    pub latency: Duration,
}

#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn probe(&self, connection_string: &str) -> Result<ProbeOutcome>;
}
