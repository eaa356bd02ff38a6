use crate::utils::error::{CalcError, Result};

pub const LOG_FORMATS: [&str; 2] = ["compact", "json"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CalcError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CalcError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_port(field_name: &str, port: u16) -> Result<()> {
    if port == 0 {
        return Err(CalcError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: port.to_string(),
            reason: "Port must be between 1 and 65535".to_string(),
        });
    }
    Ok(())
}

pub fn validate_log_format(field_name: &str, format: &str) -> Result<()> {
    if !LOG_FORMATS.contains(&format) {
        return Err(CalcError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format.to_string(),
            reason: format!(
                "Unsupported log format. Valid formats: {}",
                LOG_FORMATS.join(", ")
            ),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CalcError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CalcError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("config", "./symcalc.toml").is_ok());
        assert!(validate_path("config", "").is_err());
        assert!(validate_path("config", "a\0b").is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(validate_port("port", 5000).is_ok());
        assert!(validate_port("port", 0).is_err());
    }

    #[test]
    fn test_validate_log_format() {
        assert!(validate_log_format("logging.format", "json").is_ok());
        assert!(validate_log_format("logging.format", "compact").is_ok());
        assert!(validate_log_format("logging.format", "pretty").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("request_timeout", 10u64, 1, 3600).is_ok());
        assert!(validate_range("request_timeout", 0u64, 1, 3600).is_err());
        assert!(validate_range("request_timeout", 7200u64, 1, 3600).is_err());
    }
}
