use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
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
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("static regex"))
}

/// Lowercase, unquoted PostgreSQL identifier of at most 63 bytes.
pub fn validate_sql_identifier(field_name: &str, value: &str) -> Result<()> {
    if value.len() > 63 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Identifier must be at most 63 characters".to_string(),
        });
    }
    if !identifier_pattern().is_match(value) {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Use lowercase letters, digits and underscores, not starting with a digit"
                .to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api.base_url", "https://api.hh.ru").is_ok());
        assert!(validate_url("api.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("api.base_url", "").is_err());
        assert!(validate_url("api.base_url", "invalid-url").is_err());
        assert!(validate_url("api.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("api.vacancies_per_page", 100, 1).is_ok());
        assert!(validate_positive_number("api.vacancies_per_page", 0, 1).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("store.user", &missing),
            Err(EtlError::MissingConfigError { .. })
        ));
        let present = Some("postgres".to_string());
        assert_eq!(validate_required_field("store.user", &present).unwrap(), "postgres");
    }

    #[test]
    fn test_validate_sql_identifier() {
        assert!(validate_sql_identifier("database", "hh_sandbox_jobs").is_ok());
        assert!(validate_sql_identifier("database", "_tmp1").is_ok());
        assert!(validate_sql_identifier("database", "1abc").is_err());
        assert!(validate_sql_identifier("database", "Jobs").is_err());
        assert!(validate_sql_identifier("database", "jobs; DROP DATABASE postgres").is_err());
        assert!(validate_sql_identifier("database", &"a".repeat(64)).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("store.port", 5432u16, 1, u16::MAX).is_ok());
        assert!(validate_range("store.port", 0u16, 1, u16::MAX).is_err());
    }
}
