use crate::config::toml_config::Overrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "backend-smoke")]
#[command(about = "Smoke checks for the backend API and its database", version)]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:5000
    #[arg(long, env = "SMOKE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Log CPU and memory usage
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Exit non-zero when any scenario fails
    #[arg(long, global = true)]
    pub strict: bool,

    /// Write the run report to a .json or .csv file
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Connect to the database named by an environment variable
    Db {
        /// Environment variable holding the connection string
        #[arg(long)]
        env_var: Option<String>,
    },
    /// Log in and fetch pending orders
    Orders(LoginArgs),
    /// Register a new account and verify its referral code
    Referral(RegisterArgs),
    /// Run every scenario in sequence
    All(LoginArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct LoginArgs {
    #[arg(long, env = "SMOKE_EMAIL")]
    pub email: Option<String>,

    #[arg(long, env = "SMOKE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub role: Option<String>,

    /// Register with the email exactly as given
    #[arg(long)]
    pub no_unique_email: bool,
}

impl CliConfig {
    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout,
            ..Overrides::default()
        };

        match &self.command {
            Command::Db { env_var } => {
                overrides.database_env_var = env_var.clone();
            }
            Command::Orders(login) | Command::All(login) => {
                overrides.login_email = login.email.clone();
                overrides.login_password = login.password.clone();
            }
            Command::Referral(register) => {
                overrides.registration_name = register.name.clone();
                overrides.registration_email = register.email.clone();
                overrides.registration_password = register.password.clone();
                overrides.registration_role = register.role.clone();
                if register.no_unique_email {
                    overrides.unique_email = Some(false);
                }
            }
        }

        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_orders_command() {
        let cli = CliConfig::parse_from([
            "backend-smoke",
            "--base-url",
            "http://127.0.0.1:5000",
            "orders",
            "--email",
            "owner@example.com",
            "--password",
            "pw",
            "--strict",
        ]);

        assert!(cli.strict);
        let overrides = cli.overrides();
        assert_eq!(overrides.base_url.as_deref(), Some("http://127.0.0.1:5000"));
        assert_eq!(overrides.login_email.as_deref(), Some("owner@example.com"));
        assert_eq!(overrides.login_password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_parse_referral_command() {
        let cli = CliConfig::parse_from([
            "backend-smoke",
            "referral",
            "--role",
            "seller",
            "--no-unique-email",
        ]);

        let overrides = cli.overrides();
        assert_eq!(overrides.registration_role.as_deref(), Some("seller"));
        assert_eq!(overrides.unique_email, Some(false));
    }

    #[test]
    fn test_parse_db_command_with_report() {
        let cli = CliConfig::parse_from([
            "backend-smoke",
            "db",
            "--env-var",
            "DATABASE_URL",
            "--report",
            "out/run.json",
        ]);

        assert!(matches!(cli.command, Command::Db { .. }));
        assert_eq!(cli.report, Some(PathBuf::from("out/run.json")));
        assert_eq!(cli.overrides().database_env_var.as_deref(), Some("DATABASE_URL"));
    }
}
