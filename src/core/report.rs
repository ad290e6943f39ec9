use crate::core::runner::{RunSummary, ScenarioReport, SmokeRunner};
use crate::utils::error::{Result, SmokeError};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

impl ReportFormat {
    /// 依副檔名決定輸出格式
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ReportFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(ReportFormat::Csv),
            _ => Err(SmokeError::InvalidConfigValueError {
                field: "report".to_string(),
                value: path.display().to_string(),
                reason: "Unsupported report format. Valid formats: json, csv".to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    base_url: &'a str,
    summary: RunSummary,
    scenarios: &'a [ScenarioReport],
}

#[derive(Serialize)]
struct CsvRow<'a> {
    scenario: &'a str,
    check: &'a str,
    passed: bool,
    detail: &'a str,
}

/// 終端機輸出
pub fn render_console(reports: &[ScenarioReport]) -> String {
    let mut lines = Vec::new();

    for report in reports {
        let mark = if report.passed { "✅" } else { "❌" };
        lines.push(format!("{} {} ({} ms)", mark, report.scenario, report.duration_ms));

        for check in &report.checks {
            let mark = if check.passed { "✅" } else { "❌" };
            lines.push(format!("   {} {}: {}", mark, check.name, check.detail));
        }
        for note in &report.notes {
            lines.push(format!("   • {}", note));
        }
        if let Some(error) = &report.error {
            lines.push(format!("   ❌ {}", error));
        }
    }

    let summary = SmokeRunner::summarize(reports);
    lines.push(format!(
        "📈 {}/{} scenarios passed, {} check(s), {} failed, {} ms",
        summary.passed_scenarios,
        summary.total_scenarios,
        summary.total_checks,
        summary.failed_checks,
        summary.total_duration_ms
    ));

    lines.join("\n")
}

pub fn to_json(reports: &[ScenarioReport], base_url: &str) -> Result<String> {
    let report = JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        base_url,
        summary: SmokeRunner::summarize(reports),
        scenarios: reports,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// 每個檢查一列；沒有任何檢查的失敗場景以 `error` 列呈現
pub fn to_csv(reports: &[ScenarioReport]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for report in reports {
        for check in &report.checks {
            writer.serialize(CsvRow {
                scenario: &report.scenario,
                check: &check.name,
                passed: check.passed,
                detail: &check.detail,
            })?;
        }
        if let Some(error) = &report.error {
            writer.serialize(CsvRow {
                scenario: &report.scenario,
                check: "error",
                passed: false,
                detail: error,
            })?;
        }
    }

    let bytes = writer.into_inner().map_err(|e| SmokeError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| SmokeError::ConfigError {
        message: format!("CSV report is not valid UTF-8: {}", e),
    })
}

pub fn write_report(path: &Path, reports: &[ScenarioReport], base_url: &str) -> Result<()> {
    let content = match ReportFormat::from_path(path)? {
        ReportFormat::Json => to_json(reports, base_url)?,
        ReportFormat::Csv => to_csv(reports)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    tracing::info!("📁 Report saved to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checks::CheckResult;
    use crate::utils::error::ErrorSeverity;
    use tempfile::TempDir;

    fn sample_reports() -> Vec<ScenarioReport> {
        vec![
            ScenarioReport {
                scenario: "orders".to_string(),
                passed: true,
                checks: vec![
                    CheckResult::pass("token_present", "token received (3 chars)"),
                    CheckResult::pass("orders_is_array", "2 pending order(s)"),
                ],
                notes: vec!["#1 [pending]".to_string()],
                error: None,
                severity: None,
                exit_on_failure: false,
                duration_ms: 12,
            },
            ScenarioReport {
                scenario: "db".to_string(),
                passed: false,
                checks: Vec::new(),
                notes: Vec::new(),
                error: Some("MONGO_URI is not set".to_string()),
                severity: Some(ErrorSeverity::High),
                exit_on_failure: true,
                duration_ms: 0,
            },
        ]
    }

    #[test]
    fn test_report_format_from_extension() {
        assert_eq!(ReportFormat::from_path(Path::new("out/run.json")).unwrap(), ReportFormat::Json);
        assert_eq!(ReportFormat::from_path(Path::new("run.CSV")).unwrap(), ReportFormat::Csv);
        assert!(ReportFormat::from_path(Path::new("run.txt")).is_err());
        assert!(ReportFormat::from_path(Path::new("run")).is_err());
    }

    #[test]
    fn test_console_output_marks_failures() {
        let text = render_console(&sample_reports());
        assert!(text.contains("✅ orders"));
        assert!(text.contains("❌ db"));
        assert!(text.contains("MONGO_URI is not set"));
        assert!(text.contains("1/2 scenarios passed"));
    }

    #[test]
    fn test_csv_has_one_row_per_check_plus_errors() {
        let csv = to_csv(&sample_reports()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "scenario,check,passed,detail");
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("db,error,false,"));
    }

    #[test]
    fn test_write_json_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports/run.json");

        write_report(&path, &sample_reports(), "http://localhost:5000").unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["base_url"], "http://localhost:5000");
        assert_eq!(written["summary"]["total_scenarios"], 2);
        assert_eq!(written["scenarios"][1]["severity"], "High");
    }
}
