use crate::domain::ports::{DatabaseProbe, ProbeMethod, ProbeOutcome};
use crate::utils::error::{Result, SmokeError};
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;
use regex::Regex;
use sqlx::{AnyConnection, Connection};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

const SQL_SCHEMES: &[&str] = &["postgres", "postgresql", "mysql", "mariadb", "sqlite"];
const MONGO_SCHEMES: &[&str] = &["mongodb", "mongodb+srv"];

const CREDENTIALS_PATTERN: &str = r"^([A-Za-z][A-Za-z0-9+.\-]*://)([^:@/]*):[^@/]*@";

/// 依連線字串的 scheme 選擇檢查方式：
/// SQL 資料庫登入並 `SELECT 1`，MongoDB 以官方 driver 執行 `ping`，其他只測 TCP 可達
pub struct ConnectivityProbe {
    connect_timeout: Duration,
}

impl ConnectivityProbe {
    pub fn new(connect_timeout: Duration) -> Self {
        sqlx::any::install_default_drivers();
        Self { connect_timeout }
    }

    /// 整個連線、查詢、關閉流程共用同一個逾時
    async fn bounded<F>(&self, target: &str, probe: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        timeout(self.connect_timeout, probe)
            .await
            .map_err(|_| SmokeError::Database {
                message: format!(
                    "{} did not answer within {:?}",
                    target, self.connect_timeout
                ),
            })?
    }

    async fn probe_sql(&self, connection_string: &str) -> Result<()> {
        let mut conn = AnyConnection::connect(connection_string)
            .await
            .map_err(sql_error)?;

        sqlx::query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(sql_error)?;

        conn.close().await.map_err(sql_error)?;
        Ok(())
    }

    async fn probe_mongo(&self, connection_string: &str) -> Result<()> {
        let mut options = ClientOptions::parse(connection_string)
            .await
            .map_err(mongo_error)?;
        options.connect_timeout = Some(self.connect_timeout);
        options.server_selection_timeout = Some(self.connect_timeout);

        let client = Client::with_options(options).map_err(mongo_error)?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database("admin"));

        tracing::debug!("🏓 MongoDB ping on database '{}'", db.name());
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(mongo_error)?;
        Ok(())
    }

    async fn probe_tcp(&self, connection_string: &str) -> Result<()> {
        let url = Url::parse(connection_string).map_err(|e| SmokeError::Database {
            message: format!("invalid connection string: {}", e),
        })?;
        let host = url.host_str().ok_or_else(|| SmokeError::Database {
            message: format!("connection string for '{}' has no host", url.scheme()),
        })?;
        let port = url
            .port()
            .or_else(|| default_port(url.scheme()))
            .ok_or_else(|| SmokeError::Database {
                message: format!("no port given and no default known for '{}'", url.scheme()),
            })?;

        tracing::debug!("🔌 TCP probe {}:{}", host, port);
        TcpStream::connect((host, port))
            .await
            .map_err(|e| SmokeError::Database {
                message: format!("{}:{} unreachable: {}", host, port, e),
            })?;
        Ok(())
    }
}

#[async_trait]
impl DatabaseProbe for ConnectivityProbe {
    async fn probe(&self, connection_string: &str) -> Result<ProbeOutcome> {
        let scheme = scheme_of(connection_string).ok_or_else(|| SmokeError::Database {
            message: "invalid connection string: missing scheme".to_string(),
        })?;
        let target = redact_connection_string(connection_string);

        let started = Instant::now();
        let method = if SQL_SCHEMES.contains(&scheme.as_str()) {
            self.bounded(&target, self.probe_sql(connection_string))
                .await?;
            ProbeMethod::SqlQuery
        } else if MONGO_SCHEMES.contains(&scheme.as_str()) {
            self.bounded(&target, self.probe_mongo(connection_string))
                .await?;
            ProbeMethod::MongoPing
        } else {
            self.bounded(&target, self.probe_tcp(connection_string))
                .await?;
            ProbeMethod::TcpConnect
        };

        Ok(ProbeOutcome {
            target,
            method,
            latency: started.elapsed(),
        })
    }
}

/// 取出 `scheme:` 前綴（小寫）；多主機的 MongoDB 連線字串不是合法 URL，不能交給 `Url::parse`
fn scheme_of(connection_string: &str) -> Option<String> {
    let (scheme, _) = connection_string.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "redis" | "rediss" => Some(6379),
        _ => None,
    }
}

fn sql_error(e: sqlx::Error) -> SmokeError {
    SmokeError::Database {
        message: e.to_string(),
    }
}

fn mongo_error(e: mongodb::error::Error) -> SmokeError {
    SmokeError::Database {
        message: e.to_string(),
    }
}

/// 把連線字串中的密碼換成 `***`；看不出 scheme 時整段遮蔽
pub fn redact_connection_string(connection_string: &str) -> String {
    if scheme_of(connection_string).is_none() {
        return "***".to_string();
    }
    match Regex::new(CREDENTIALS_PATTERN) {
        Ok(re) => re
            .replace(connection_string, "${1}${2}:***@")
            .into_owned(),
        Err(_) => "***".to_string(),
    }
}
