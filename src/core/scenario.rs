use crate::core::checks::{self, CheckResult, DATABASE_REACHABLE};
use crate::domain::model::{Credentials, Registration};
use crate::domain::ports::{BackendApi, DatabaseProbe};
use crate::utils::error::{Result, SmokeError};
use async_trait::async_trait;
use serde::Serialize;

/// 場景執行過程中累積的檢查結果與輸出
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioOutcome {
    pub checks: Vec<CheckResult>,
    pub notes: Vec<String>,
}

impl ScenarioOutcome {
    pub fn record(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// 記錄檢查，失敗時中止場景後續步驟
    pub fn require(&mut self, check: CheckResult) -> Result<()> {
        let failure = (!check.passed).then(|| SmokeError::CheckFailed {
            check: check.name.clone(),
            detail: check.detail.clone(),
        });
        self.checks.push(check);
        failure.map_or(Ok(()), Err)
    }

    pub fn note(&mut self, line: impl Into<String>) {
        self.notes.push(line.into());
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, outcome: &mut ScenarioOutcome) -> Result<()>;

    /// 失敗時是否必須以非零狀態結束程序
    fn exit_on_failure(&self) -> bool {
        false
    }
}

/// 從環境變數讀取連線字串並測試資料庫連線
pub struct DatabaseScenario<P: DatabaseProbe> {
    probe: P,
    env_var: String,
}

impl<P: DatabaseProbe> DatabaseScenario<P> {
    pub fn new(probe: P, env_var: impl Into<String>) -> Self {
        Self {
            probe,
            env_var: env_var.into(),
        }
    }
}

#[async_trait]
impl<P: DatabaseProbe> Scenario for DatabaseScenario<P> {
    fn name(&self) -> &str {
        "db"
    }

    async fn run(&self, outcome: &mut ScenarioOutcome) -> Result<()> {
        let connection_string = std::env::var(&self.env_var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SmokeError::MissingEnv {
                name: self.env_var.clone(),
            })?;

        let probe = self.probe.probe(&connection_string).await?;
        tracing::info!("🗄️ Connected to {} in {:?}", probe.target, probe.latency);

        outcome.record(CheckResult::pass(
            DATABASE_REACHABLE,
            format!("{} via {:?} in {:?}", probe.target, probe.method, probe.latency),
        ));
        Ok(())
    }

    fn exit_on_failure(&self) -> bool {
        true
    }
}

/// 登入後取得待處理訂單
pub struct PendingOrdersScenario<B: BackendApi> {
    backend: B,
    credentials: Credentials,
}

impl<B: BackendApi> PendingOrdersScenario<B> {
    pub fn new(backend: B, credentials: Credentials) -> Self {
        Self {
            backend,
            credentials,
        }
    }
}

#[async_trait]
impl<B: BackendApi> Scenario for PendingOrdersScenario<B> {
    fn name(&self) -> &str {
        "orders"
    }

    async fn run(&self, outcome: &mut ScenarioOutcome) -> Result<()> {
        tracing::info!("🔑 Logging in as {}", self.credentials.email);
        let auth = self.backend.login(&self.credentials).await?;
        outcome.require(checks::token_present(&auth.token))?;

        let orders = match self.backend.pending_orders(&auth.token).await {
            Ok(orders) => orders,
            Err(e @ SmokeError::UnexpectedResponse { .. }) => {
                outcome.record(CheckResult::fail(checks::ORDERS_IS_ARRAY, e.to_string()));
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        tracing::info!("📦 Received {} pending order(s)", orders.len());
        outcome.record(checks::orders_is_array(&orders));

        for order in &orders {
            outcome.note(order.summary());
        }
        Ok(())
    }
}

/// 註冊新帳號並確認 `/me` 回傳相同的推薦碼
pub struct ReferralScenario<B: BackendApi> {
    backend: B,
    registration: Registration,
    unique_email: bool,
}

impl<B: BackendApi> ReferralScenario<B> {
    pub fn new(backend: B, registration: Registration) -> Self {
        Self {
            backend,
            registration,
            unique_email: true,
        }
    }

    pub fn with_unique_email(mut self, unique: bool) -> Self {
        self.unique_email = unique;
        self
    }

    fn registration_for_run(&self) -> Registration {
        let mut registration = self.registration.clone();
        if self.unique_email {
            let tag = chrono::Utc::now().timestamp_millis().to_string();
            registration.email = tag_email(&registration.email, &tag);
        }
        registration
    }
}

#[async_trait]
impl<B: BackendApi> Scenario for ReferralScenario<B> {
    fn name(&self) -> &str {
        "referral"
    }

    async fn run(&self, outcome: &mut ScenarioOutcome) -> Result<()> {
        let registration = self.registration_for_run();
        tracing::info!("📝 Registering {} as {}", registration.email, registration.role);
        outcome.note(format!("registered {}", registration.email));

        let auth = self.backend.register(&registration).await?;
        outcome.require(checks::token_present(&auth.token))?;
        outcome.require(checks::referral_code_present(auth.referral_code.as_ref()))?;

        let Some(registered_code) = auth.referral_code else {
            return Ok(());
        };

        let profile = self.backend.me(&auth.token).await?;
        outcome.record(checks::referral_code_matches(
            &registered_code,
            profile.referral_code.as_ref(),
        ));
        Ok(())
    }
}

/// `qa@example.com` + `123` -> `qa+123@example.com`
pub fn tag_email(email: &str, tag: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => format!("{}+{}@{}", local, tag, domain),
        None => format!("{}+{}", email, tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_email() {
        assert_eq!(tag_email("qa@example.com", "42"), "qa+42@example.com");
        assert_eq!(tag_email("qa", "42"), "qa+42");
    }

    #[test]
    fn test_require_stops_on_failed_check() {
        let mut outcome = ScenarioOutcome::default();
        assert!(outcome
            .require(CheckResult::pass("first", "ok"))
            .is_ok());

        let err = outcome
            .require(CheckResult::fail("second", "nope"))
            .unwrap_err();
        assert!(matches!(err, SmokeError::CheckFailed { ref check, .. } if check == "second"));
        assert_eq!(outcome.checks.len(), 2);
        assert!(!outcome.all_passed());
    }
}
