use anyhow::Result;
use backend_smoke::core::report;
use backend_smoke::{build_runner, Selection, SmokeConfig, SmokeRunner};
use httpmock::prelude::*;
use tempfile::TempDir;

fn write_config(temp_dir: &TempDir, base_url: &str, db_env_var: &str) -> Result<SmokeConfig> {
    let config_content = format!(
        r#"
[backend]
base_url = "{}"
timeout_seconds = 5

[login]
email = "owner@example.com"
password = "${{BACKEND_SMOKE_IT_PASSWORD}}"

[registration]
name = "Suite Tester"
email = "suite@example.com"
password = "pw123456"
role = "customer"
unique_email = false

[database]
env_var = "{}"
connect_timeout_seconds = 5
"#,
        base_url, db_env_var
    );

    let config_path = temp_dir.path().join("backend-smoke.toml");
    std::fs::write(&config_path, config_content)?;
    Ok(SmokeConfig::from_file(&config_path)?)
}

fn mock_healthy_backend(server: &MockServer) {
    server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/login")
            .json_body(serde_json::json!({
                "email": "owner@example.com",
                "password": "suite-secret"
            }));
        then.status(200).json_body(serde_json::json!({"token": "login-token"}));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/api/orders/pending")
            .header("x-auth-token", "login-token");
        then.status(200).json_body(serde_json::json!([{"_id": "o1", "status": "pending"}]));
    });

    server.mock(|when, then| {
        when.method(POST).path("/api/auth/register");
        then.status(200).json_body(serde_json::json!({
            "token": "register-token",
            "referralCode": "SUITE1"
        }));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/api/auth/me")
            .header("x-auth-token", "register-token");
        then.status(200).json_body(serde_json::json!({"referralCode": "SUITE1"}));
    });
}

#[tokio::test]
async fn test_full_suite_from_config_file() -> Result<()> {
    std::env::set_var("BACKEND_SMOKE_IT_PASSWORD", "suite-secret");
    std::env::set_var("BACKEND_SMOKE_IT_DB_OK", "sqlite::memory:");

    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    mock_healthy_backend(&server);

    let config = write_config(&temp_dir, &server.base_url(), "BACKEND_SMOKE_IT_DB_OK")?;
    let runner = build_runner(&config, Selection::All, false)?;
    let reports = runner.run_all().await;

    let names: Vec<&str> = reports.iter().map(|r| r.scenario.as_str()).collect();
    assert_eq!(names, vec!["db", "orders", "referral"]);
    assert!(reports.iter().all(|r| r.passed), "reports: {:?}", reports);
    assert_eq!(SmokeRunner::exit_code(&reports, true), 0);

    let report_path = temp_dir.path().join("out/run.csv");
    report::write_report(&report_path, &reports, &config.backend.base_url)?;
    let csv = std::fs::read_to_string(&report_path)?;
    assert!(csv.starts_with("scenario,check,passed,detail"));
    assert!(csv.contains("referral,referral_code_matches,true"));

    std::env::remove_var("BACKEND_SMOKE_IT_DB_OK");
    Ok(())
}

#[tokio::test]
async fn test_missing_database_env_exits_non_zero() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = write_config(
        &temp_dir,
        "http://127.0.0.1:9",
        "BACKEND_SMOKE_IT_DB_NEVER_SET",
    )?;

    let runner = build_runner(&config, Selection::Database, false)?;
    let reports = runner.run_all().await;

    assert_eq!(reports.len(), 1);
    assert!(!reports[0].passed);
    assert!(reports[0]
        .error
        .as_deref()
        .unwrap()
        .contains("BACKEND_SMOKE_IT_DB_NEVER_SET"));
    assert_eq!(SmokeRunner::exit_code(&reports, false), 1);
    Ok(())
}

#[tokio::test]
async fn test_backend_failure_does_not_stop_other_scenarios() -> Result<()> {
    std::env::set_var("BACKEND_SMOKE_IT_PASSWORD", "suite-secret");

    let temp_dir = TempDir::new()?;
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(500).body("Server Error");
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/register");
        then.status(200).json_body(serde_json::json!({
            "token": "register-token",
            "referralCode": "SUITE1"
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/auth/me");
        then.status(200).json_body(serde_json::json!({"referralCode": "SUITE1"}));
    });

    let config = write_config(&temp_dir, &server.base_url(), "BACKEND_SMOKE_IT_DB_UNUSED")?;
    let runner = build_runner(&config, Selection::All, false)?;
    let reports = runner.run_all().await;

    assert!(!reports[0].passed, "db env var is not set");
    assert!(!reports[1].passed, "login returns 500");
    assert!(reports[2].passed, "referral is independent");

    // 預設僅資料庫失敗影響退出碼；strict 取最嚴重等級（db 缺 env 為 High）
    assert_eq!(SmokeRunner::exit_code(&reports, false), 1);
    assert_eq!(SmokeRunner::exit_code(&reports, true), 1);

    let console = report::render_console(&reports);
    assert!(console.contains("❌ orders"));
    assert!(console.contains("✅ referral"));
    assert!(console.contains("1/3 scenarios passed"));
    Ok(())
}
