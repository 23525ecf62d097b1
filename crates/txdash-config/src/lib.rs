//! Configuration management for txdash
//!
//! This module handles loading, validation, and management of
//! txdash configuration from YAML files.

pub mod error;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigErrorSeverity};

/// Page size the remote transaction endpoint slices by
pub const SERVICE_PAGE_SIZE: u32 = 10;

// ==================== Configuration Types ====================

/// Dashboard server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8082
}

/// Remote transaction service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base address of the transaction service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// Dashboard view settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Month selected at startup: a month name or "current"
    #[serde(default = "default_month")]
    pub default_month: String,
    /// Records per page (fixed by the service)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_month: default_month(),
            page_size: default_page_size(),
        }
    }
}

fn default_month() -> String {
    "March".to_string()
}

fn default_page_size() -> u32 {
    SERVICE_PAGE_SIZE
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Calendar month enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// All months in calendar order
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Full English name, as the service expects it
    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Month from its 1-based number
    pub fn from_number(number: u32) -> Option<Month> {
        let index = usize::try_from(number.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }

    /// 1-based month number
    pub fn number(&self) -> u32 {
        Self::ALL.iter().position(|m| m == self).map_or(1, |i| i as u32 + 1)
    }

    /// The current month in UTC
    pub fn current() -> Month {
        let today = chrono::Utc::now().date_naive();
        Month::from_number(today.month()).unwrap_or(Month::January)
    }
}

impl Default for Month {
    fn default() -> Self {
        Month::March
    }
}

impl std::str::FromStr for Month {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Month::ALL
            .iter()
            .find(|m| {
                let name = m.name().to_lowercase();
                name == wanted || (wanted.len() == 3 && name.starts_with(&wanted))
            })
            .copied()
            .ok_or_else(|| format!("Invalid month: {}", s))
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Dashboard server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote service settings
    #[serde(default)]
    pub service: ServiceConfig,
    /// Dashboard view settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::IoError { message: e.to_string() })?;

        let config = Self::from_yaml(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML text without validating it
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.service.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "service.base_url".to_string(),
            });
        }

        if self.service.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "service.request_timeout_secs".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.dashboard.page_size != SERVICE_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.page_size".to_string(),
                reason: format!("The service pages by {} records", SERVICE_PAGE_SIZE),
            });
        }

        self.initial_month()?;

        Ok(())
    }

    /// Month the dashboard opens on
    pub fn initial_month(&self) -> Result<Month, ConfigError> {
        let raw = self.dashboard.default_month.trim();
        if raw.eq_ignore_ascii_case("current") {
            return Ok(Month::current());
        }
        raw.parse().map_err(|reason| ConfigError::InvalidValue {
            field: "dashboard.default_month".to_string(),
            reason,
        })
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Socket address the dashboard server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Base URL without a trailing slash
    pub fn service_base_url(&self) -> String {
        self.service.base_url.trim_end_matches('/').to_string()
    }
}

// ==================== Tests ====================
