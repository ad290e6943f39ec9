use backend_smoke::config::{CliConfig, Command, SmokeConfig};
use backend_smoke::core::report;
use backend_smoke::utils::{logger, validation::Validate};
use backend_smoke::{build_runner, Selection, SmokeError, SmokeRunner};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting backend-smoke");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => exit_with(&e, 1),
    };
    tracing::info!("🎯 Target backend: {}", config.backend.base_url);

    let selection = match cli.command {
        Command::Db { .. } => Selection::Database,
        Command::Orders(_) => Selection::Orders,
        Command::Referral(_) => Selection::Referral,
        Command::All(_) => Selection::All,
    };

    let runner = match build_runner(&config, selection, cli.monitor) {
        Ok(runner) => runner,
        Err(e) => exit_with(&e, 1),
    };

    let reports = runner.run_all().await;
    println!("{}", report::render_console(&reports));

    if let Some(path) = &cli.report {
        if let Err(e) = report::write_report(path, &reports, &config.backend.base_url) {
            exit_with(&e, e.severity().exit_code());
        }
    }

    let exit_code = SmokeRunner::exit_code(&reports, cli.strict);
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

fn load_config(cli: &CliConfig) -> Result<SmokeConfig, SmokeError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            SmokeConfig::from_file(path)?
        }
        None => SmokeConfig::default(),
    };

    // 應用命令列覆蓋設定
    config.apply_overrides(&cli.overrides());
    config.validate()?;

    if let Some(path) = &cli.report {
        report::ReportFormat::from_path(path)?;
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    Ok(config)
}

fn exit_with(e: &SmokeError, code: i32) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(code)
}
