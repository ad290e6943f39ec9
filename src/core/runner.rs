use crate::core::checks::CheckResult;
use crate::core::scenario::{Scenario, ScenarioOutcome};
use crate::utils::error::ErrorSeverity;
use crate::utils::monitor::SystemMonitor;
use serde::Serialize;
use std::time::{Duration, Instant};

/// 單一場景的執行報告
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub passed: bool,
    pub checks: Vec<CheckResult>,
    pub notes: Vec<String>,
    pub error: Option<String>,
    pub severity: Option<ErrorSeverity>,
    pub exit_on_failure: bool,
    pub duration_ms: u64,
}

/// 整體執行摘要
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_scenarios: usize,
    pub passed_scenarios: usize,
    pub failed_scenarios: Vec<String>,
    pub total_checks: usize,
    pub failed_checks: usize,
    pub total_duration_ms: u64,
}

/// 依序執行場景，場景之間不共享任何狀態
pub struct SmokeRunner {
    scenarios: Vec<Box<dyn Scenario>>,
    monitor: Option<SystemMonitor>,
}

impl SmokeRunner {
    pub fn new() -> Self {
        Self {
            scenarios: Vec::new(),
            monitor: None,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled.then(|| SystemMonitor::new(true));
        self
    }

    pub fn add_scenario(&mut self, scenario: Box<dyn Scenario>) {
        self.scenarios.push(scenario);
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub async fn run_all(&self) -> Vec<ScenarioReport> {
        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Smoke run started");
        }

        let mut reports = Vec::with_capacity(self.scenarios.len());
        for scenario in &self.scenarios {
            reports.push(self.run_scenario(scenario.as_ref()).await);
        }

        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Smoke run completed");
        }

        reports
    }

    async fn run_scenario(&self, scenario: &dyn Scenario) -> ScenarioReport {
        tracing::info!("▶️ Running scenario: {}", scenario.name());
        let start_time = Instant::now();
        let mut outcome = ScenarioOutcome::default();

        let result = scenario.run(&mut outcome).await;
        let duration = start_time.elapsed();

        let (error, severity) = match result {
            Ok(()) => (None, None),
            Err(e) => {
                tracing::error!(
                    "❌ Scenario {} failed: {} (Category: {:?}, Severity: {:?})",
                    scenario.name(),
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                (Some(e.user_friendly_message()), Some(e.severity()))
            }
        };

        let passed = error.is_none() && outcome.all_passed();
        if passed {
            tracing::info!("✅ Scenario {} passed in {:?}", scenario.name(), duration);
        }

        ScenarioReport {
            scenario: scenario.name().to_string(),
            passed,
            checks: outcome.checks,
            notes: outcome.notes,
            error,
            severity,
            exit_on_failure: scenario.exit_on_failure(),
            duration_ms: duration_millis(duration),
        }
    }

    pub fn summarize(reports: &[ScenarioReport]) -> RunSummary {
        let total_duration: u64 = reports.iter().map(|r| r.duration_ms).sum();
        let total_checks: usize = reports.iter().map(|r| r.checks.len()).sum();
        let failed_checks: usize = reports
            .iter()
            .flat_map(|r| r.checks.iter())
            .filter(|c| !c.passed)
            .count();

        RunSummary {
            total_scenarios: reports.len(),
            passed_scenarios: reports.iter().filter(|r| r.passed).count(),
            failed_scenarios: reports
                .iter()
                .filter(|r| !r.passed)
                .map(|r| r.scenario.clone())
                .collect(),
            total_checks,
            failed_checks,
            total_duration_ms: total_duration,
        }
    }

    /// 計算程序退出碼
    ///
    /// 預設只有標記為 `exit_on_failure` 的場景（資料庫檢查）失敗時才回傳 1；
    /// `strict` 模式下任何失敗都會依最嚴重的錯誤等級決定退出碼。
    pub fn exit_code(reports: &[ScenarioReport], strict: bool) -> i32 {
        if strict {
            return reports
                .iter()
                .filter(|r| !r.passed)
                .map(|r| r.severity.unwrap_or(ErrorSeverity::High))
                .max()
                .map_or(0, ErrorSeverity::exit_code);
        }

        if reports.iter().any(|r| !r.passed && r.exit_on_failure) {
            1
        } else {
            0
        }
    }
}

impl Default for SmokeRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
