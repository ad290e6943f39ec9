use crate::adapters::{ConnectivityProbe, HttpBackend};
use crate::config::SmokeConfig;
use crate::core::runner::SmokeRunner;
use crate::core::scenario::{
    DatabaseScenario, PendingOrdersScenario, ReferralScenario, Scenario, ScenarioOutcome,
};
use crate::utils::error::{Result, SmokeError};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Database,
    Orders,
    Referral,
    All,
}

impl Selection {
    fn includes(self, other: Selection) -> bool {
        self == Selection::All || self == other
    }
}

/// 依照選擇建立場景；缺少設定的場景在執行時才報錯，不影響其他場景
pub fn build_runner(config: &SmokeConfig, selection: Selection, monitor: bool) -> Result<SmokeRunner> {
    let mut runner = SmokeRunner::new().with_monitoring(monitor);

    if selection.includes(Selection::Database) {
        let probe = ConnectivityProbe::new(config.connect_timeout());
        runner.add_scenario(Box::new(DatabaseScenario::new(
            probe,
            config.database.env_var.clone(),
        )));
    }

    if selection == Selection::Database {
        return Ok(runner);
    }

    let backend = HttpBackend::new(config.backend.base_url.clone(), config.request_timeout())?;

    if selection.includes(Selection::Orders) {
        match config.credentials() {
            Ok(credentials) => runner.add_scenario(Box::new(PendingOrdersScenario::new(
                backend.clone(),
                credentials,
            ))),
            Err(e) => runner.add_scenario(Box::new(MisconfiguredScenario::new("orders", e))),
        }
    }

    if selection.includes(Selection::Referral) {
        runner.add_scenario(Box::new(
            ReferralScenario::new(backend, config.registration())
                .with_unique_email(config.registration.unique_email),
        ));
    }

    Ok(runner)
}

/// 設定不完整的場景，執行時直接回報設定錯誤
struct MisconfiguredScenario {
    name: &'static str,
    error: Mutex<Option<SmokeError>>,
}

impl MisconfiguredScenario {
    fn new(name: &'static str, error: SmokeError) -> Self {
        Self {
            name,
            error: Mutex::new(Some(error)),
        }
    }
}

#[async_trait]
impl Scenario for MisconfiguredScenario {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, _outcome: &mut ScenarioOutcome) -> Result<()> {
        let error = self.error.lock().ok().and_then(|mut slot| slot.take());
        Err(error.unwrap_or_else(|| SmokeError::ConfigError {
            message: format!("scenario '{}' is not configured", self.name),
        }))
    }
}
