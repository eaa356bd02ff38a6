use crate::utils::error::{CalcError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    /// EnvFilter directive, e.g. `info` or `symcalc=debug`
    pub level: Option<String>,
    /// `compact` or `json`
    pub format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CalcError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CalcError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SYMCALC_PORT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CalcError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        // 未設定的變數保持原樣
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(host) = &self.server.host {
            validation::validate_non_empty_string("server.host", host)?;
        }
        if let Some(port) = self.server.port {
            validation::validate_port("server.port", port)?;
        }
        if let Some(timeout) = self.server.request_timeout_seconds {
            validation::validate_range("server.request_timeout_seconds", timeout, 1, 3600)?;
        }
        if let Some(level) = &self.logging.level {
            validation::validate_non_empty_string("logging.level", level)?;
        }
        if let Some(format) = &self.logging.format {
            validation::validate_log_format("logging.format", format)?;
        }
        Ok(())
    }

    /// 是否使用 JSON 日誌
    pub fn json_logs(&self) -> bool {
        self.logging.format.as_deref() == Some("json")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[server]
host = "0.0.0.0"
port = 8080
request_timeout_seconds = 30

[logging]
level = "debug"
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.server.port, Some(8080));
        assert_eq!(config.server.request_timeout_seconds, Some(30));
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections_are_optional() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.server.port.is_none());
        assert!(!config.json_logs());

        let config = TomlConfig::from_toml_str("[server]\nport = 5001\n").unwrap();
        assert_eq!(config.server.port, Some(5001));
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SYMCALC_TEST_HOST", "10.0.0.7");

        let toml_content = r#"
[server]
host = "${SYMCALC_TEST_HOST}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.server.host.as_deref(), Some("10.0.0.7"));

        std::env::remove_var("SYMCALC_TEST_HOST");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let config =
            TomlConfig::from_toml_str("[logging]\nlevel = \"${SYMCALC_TEST_UNSET_LEVEL}\"\n")
                .unwrap();
        assert_eq!(
            config.logging.level.as_deref(),
            Some("${SYMCALC_TEST_UNSET_LEVEL}")
        );
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str("[server]\nport = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap();
        assert!(config.validate().is_err());

        let config =
            TomlConfig::from_toml_str("[server]\nrequest_timeout_seconds = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[server]
port = 5050
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, Some(5050));
    }
}
