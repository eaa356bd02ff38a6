use std::io::Write;
use std::time::Duration;

use clap::Parser;
use symcalc::utils::validation::Validate;
use symcalc::{CliConfig, ServerSettings, TomlConfig};
use tempfile::NamedTempFile;

#[test]
fn test_settings_from_config_file() -> anyhow::Result<()> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(
        br#"
[server]
host = "0.0.0.0"
port = 8080
request_timeout_seconds = 3

[logging]
level = "symcalc=trace"
format = "compact"
"#,
    )?;

    let path = temp_file.path().to_string_lossy().to_string();
    let cli = CliConfig::parse_from(["symcalc", "--config", path.as_str()]);
    let file = TomlConfig::from_file(&path)?;
    file.validate()?;

    let settings = ServerSettings::resolve(&cli, Some(&file));
    assert_eq!(settings.bind_address(), "0.0.0.0:8080");
    assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    assert_eq!(settings.log_level.as_deref(), Some("symcalc=trace"));
    assert!(!settings.json_logs);
    Ok(())
}

#[test]
fn test_flags_override_file_and_enable_json_logs() -> anyhow::Result<()> {
    let file = TomlConfig::from_toml_str("[server]\nport = 8080\n")?;
    let cli = CliConfig::parse_from([
        "symcalc",
        "--host",
        "localhost",
        "--port",
        "9090",
        "--request-timeout",
        "30",
        "--json-logs",
    ]);
    cli.validate()?;

    let settings = ServerSettings::resolve(&cli, Some(&file));
    assert_eq!(settings.bind_address(), "localhost:9090");
    assert_eq!(settings.request_timeout_seconds, 30);
    assert!(settings.json_logs);
    Ok(())
}

#[test]
fn test_missing_config_file_is_io_error() {
    let err = TomlConfig::from_file("/nonexistent/symcalc.toml").unwrap_err();
    assert!(matches!(err, symcalc::CalcError::IoError(_)));
    assert_eq!(err.recovery_suggestion(), "Check that the file exists and is readable");
}

#[test]
fn test_invalid_file_values_fail_validation() -> anyhow::Result<()> {
    let file = TomlConfig::from_toml_str("[server]\nrequest_timeout_seconds = 99999\n")?;
    let err = file.validate().unwrap_err();
    assert!(err.is_config_error());
    assert!(err
        .user_friendly_message()
        .contains("server.request_timeout_seconds"));
    Ok(())
}
