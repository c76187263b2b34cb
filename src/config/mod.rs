#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range,
    validate_required_field, validate_sql_identifier, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

pub const DEFAULT_API_BASE_URL: &str = "https://api.hh.ru";
pub const DEFAULT_SANDBOX_PREFIX: &str = "hh_sandbox_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub employers_per_page: usize,
    pub vacancies_per_page: usize,
    /// hh.ru refuses to page deeper than 2000 results.
    pub max_pages: u32,
    pub sort_by: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            employers_per_page: 10,
            vacancies_per_page: 100,
            max_pages: 20,
            sort_by: "by_vacancies_open".to_string(),
            user_agent: concat!("hh-vacancy-etl/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.base_url)?;
        validate_range("api.employers_per_page", self.employers_per_page, 1, 100)?;
        validate_range("api.vacancies_per_page", self.vacancies_per_page, 1, 100)?;
        validate_positive_number("api.max_pages", self.max_pages as usize, 1)?;
        validate_positive_number("api.timeout_seconds", self.timeout_seconds as usize, 1)?;
        validate_non_empty_string("api.sort_by", &self.sort_by)?;
        validate_non_empty_string("api.user_agent", &self.user_agent)?;
        Ok(())
    }
}

/// Connection settings for the PostgreSQL server hosting store instances.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub maintenance_database: String,
    pub sandbox_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            user: None,
            password: None,
            host: "localhost".to_string(),
            port: 5432,
            maintenance_database: "postgres".to_string(),
            sandbox_prefix: DEFAULT_SANDBOX_PREFIX.to_string(),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("maintenance_database", &self.maintenance_database)
            .field("sandbox_prefix", &self.sandbox_prefix)
            .finish()
    }
}

impl StoreConfig {
    /// Overlays the `user`, `password`, `host` and `port` variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(user) = lookup("user") {
            self.user = Some(user);
        }
        if let Some(password) = lookup("password") {
            self.password = Some(password);
        }
        if let Some(host) = lookup("host") {
            self.host = host;
        }
        if let Some(port) = lookup("port") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| EtlError::InvalidConfigValueError {
                    field: "port".to_string(),
                    value: port.clone(),
                    reason: "Port must be a number between 1 and 65535".to_string(),
                })?;
        }
        Ok(())
    }

    pub fn user(&self) -> Result<&str> {
        validate_required_field("store.user", &self.user).map(String::as_str)
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("store.user", self.user()?)?;
        validate_non_empty_string("store.host", &self.host)?;
        validate_range("store.port", self.port, 1, u16::MAX)?;
        validate_non_empty_string("store.maintenance_database", &self.maintenance_database)?;
        validate_sql_identifier("store.sandbox_prefix", &self.sandbox_prefix)?;
        Ok(())
    }
}

impl AppConfig {
    /// Defaults, then the optional TOML file, then the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.store.apply_env()?;
        Ok(config)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.store.validate()
    }
}
