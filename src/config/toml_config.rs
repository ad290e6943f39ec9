use crate::domain::model::{Credentials, Registration};
use crate::utils::error::{Result, SmokeError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_DATABASE_ENV_VAR: &str = "MONGO_URI";

const PLACEHOLDER_PATTERN: &str = r"\$\{([^}]+)\}";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmokeConfig {
    pub backend: BackendConfig,
    pub login: LoginConfig,
    pub registration: RegistrationConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    /// 每次執行在 email 中加入時間戳，避免重複註冊
    pub unique_email: bool,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            name: "Smoke Tester".to_string(),
            email: "smoke@example.com".to_string(),
            password: "smoke-test-123".to_string(),
            role: "customer".to_string(),
            unique_email: true,
        }
    }
}

impl fmt::Debug for RegistrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationConfig")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"***")
            .field("role", &self.role)
            .field("unique_email", &self.unique_email)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub env_var: String,
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_DATABASE_ENV_VAR.to_string(),
            connect_timeout_seconds: 5,
        }
    }
}

/// 命令列或環境變數提供的覆蓋值，優先於設定檔
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub login_email: Option<String>,
    pub login_password: Option<String>,
    pub registration_name: Option<String>,
    pub registration_email: Option<String>,
    pub registration_password: Option<String>,
    pub registration_role: Option<String>,
    pub unique_email: Option<bool>,
    pub database_env_var: Option<String>,
}

impl SmokeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SmokeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SMOKE_PASSWORD})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = placeholder_regex()?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        set(&mut self.backend.base_url, &overrides.base_url);
        set(&mut self.backend.timeout_seconds, &overrides.timeout_seconds);
        set(&mut self.registration.name, &overrides.registration_name);
        set(&mut self.registration.email, &overrides.registration_email);
        set(&mut self.registration.password, &overrides.registration_password);
        set(&mut self.registration.role, &overrides.registration_role);
        set(&mut self.registration.unique_email, &overrides.unique_email);
        set(&mut self.database.env_var, &overrides.database_env_var);

        if overrides.login_email.is_some() {
            self.login.email = overrides.login_email.clone();
        }
        if overrides.login_password.is_some() {
            self.login.password = overrides.login_password.clone();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.database.connect_timeout_seconds)
    }

    /// 登入帳密；未設定或仍是未替換的 `${VAR}` 時視為缺少
    pub fn credentials(&self) -> Result<Credentials> {
        let email = resolved(&self.login.email);
        let password = resolved(&self.login.password);

        let email = validation::validate_required_field("login.email", &email)?;
        let password = validation::validate_required_field("login.password", &password)?;
        validation::validate_email("login.email", email)?;

        Ok(Credentials::new(email.clone(), password.clone()))
    }

    pub fn registration(&self) -> Registration {
        Registration {
            name: self.registration.name.clone(),
            email: self.registration.email.clone(),
            password: self.registration.password.clone(),
            role: self.registration.role.clone(),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("backend.base_url", &self.backend.base_url)?;
        validation::validate_range("backend.timeout_seconds", self.backend.timeout_seconds, 1, 300)?;

        validation::validate_non_empty_string("registration.name", &self.registration.name)?;
        validation::validate_email("registration.email", &self.registration.email)?;
        validation::validate_non_empty_string("registration.password", &self.registration.password)?;
        validation::validate_non_empty_string("registration.role", &self.registration.role)?;

        validation::validate_non_empty_string("database.env_var", &self.database.env_var)?;
        validation::validate_range(
            "database.connect_timeout_seconds",
            self.database.connect_timeout_seconds,
            1,
            300,
        )?;

        if let Some(email) = resolved(&self.login.email) {
            validation::validate_email("login.email", &email)?;
        }

        Ok(())
    }
}

impl Validate for SmokeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

fn placeholder_regex() -> Result<Regex> {
    Regex::new(PLACEHOLDER_PATTERN).map_err(|e| SmokeError::ConfigError {
        message: format!("invalid placeholder pattern: {}", e),
    })
}

fn resolved(value: &Option<String>) -> Option<String> {
    let value = value.as_ref()?.trim();
    if value.is_empty() || (value.starts_with("${") && value.ends_with('}')) {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SmokeConfig::from_toml_str("").unwrap();

        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.database.env_var, "MONGO_URI");
        assert!(config.registration.unique_email);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[backend]
base_url = "https://api.example.com"
timeout_seconds = 30

[login]
email = "owner@example.com"
password = "hunter2"

[registration]
name = "Referral Bot"
email = "bot@example.com"
password = "pw123456"
role = "seller"
unique_email = false

[database]
env_var = "DATABASE_URL"
connect_timeout_seconds = 3
"#;

        let config = SmokeConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.backend.base_url, "https://api.example.com");
        assert_eq!(config.backend.timeout_seconds, 30);
        assert_eq!(config.credentials().unwrap().email, "owner@example.com");
        assert_eq!(config.registration().role, "seller");
        assert!(!config.registration.unique_email);
        assert_eq!(config.connect_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BACKEND_SMOKE_TEST_BASE_URL", "https://staging.example.com");

        let toml_content = r#"
[backend]
base_url = "${BACKEND_SMOKE_TEST_BASE_URL}"
"#;

        let config = SmokeConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.backend.base_url, "https://staging.example.com");

        std::env::remove_var("BACKEND_SMOKE_TEST_BASE_URL");
    }

    #[test]
    fn test_unresolved_placeholders_count_as_missing() {
        let toml_content = r#"
[login]
email = "${BACKEND_SMOKE_TEST_UNSET_EMAIL}"
password = "${BACKEND_SMOKE_TEST_UNSET_PASSWORD}"
"#;

        let config = SmokeConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.credentials(),
            Err(SmokeError::MissingConfigError { ref field }) if field == "login.email"
        ));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = SmokeConfig::from_toml_str(
            r#"
[backend]
base_url = "https://from-file.example.com"

[login]
email = "file@example.com"
password = "file-pw"
"#,
        )
        .unwrap();

        config.apply_overrides(&Overrides {
            base_url: Some("http://127.0.0.1:9000".to_string()),
            login_password: Some("cli-pw".to_string()),
            unique_email: Some(false),
            ..Overrides::default()
        });

        assert_eq!(config.backend.base_url, "http://127.0.0.1:9000");
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.email, "file@example.com");
        assert_eq!(credentials.password, "cli-pw");
        assert!(!config.registration.unique_email);
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = SmokeConfig::from_toml_str("[backend]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(invalid_url.validate().is_err());

        let zero_timeout = SmokeConfig::from_toml_str("[backend]\ntimeout_seconds = 0\n").unwrap();
        assert!(zero_timeout.validate().is_err());

        let bad_email =
            SmokeConfig::from_toml_str("[registration]\nemail = \"not-an-email\"\n").unwrap();
        assert!(bad_email.validate().is_err());

        let empty_env = SmokeConfig::from_toml_str("[database]\nenv_var = \"\"\n").unwrap();
        assert!(empty_env.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[registration]\nrole = \"courier\"\n")
            .unwrap();

        let config = SmokeConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.registration.role, "courier");
        assert_eq!(config.registration.name, "Smoke Tester");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = SmokeConfig::from_toml_str("[backend\nbase_url = 1");
        assert!(matches!(result, Err(SmokeError::ConfigValidationError { .. })));
    }

    #[test]
    fn test_debug_hides_passwords() {
        let config = SmokeConfig::from_toml_str(
            "[login]\nemail = \"a@b.c\"\npassword = \"topsecret\"\n",
        )
        .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("smoke-test-123"));
    }
}
