use std::env;
use std::fmt;

use crate::workflows::excuses::EmployeeRef;

const DEFAULT_OVERSIGHT_ADDRESS: &str = "cto@excuses.example";
const DEFAULT_EXECUTIVE_BROADCAST_ADDRESS: &str = "all-ceos@excuses.example";
const DEFAULT_FACILITIES_ADDRESS: &str = "facilities@excuses.example";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub ladder: LadderConfig,
    pub roster: LadderRoster,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let ladder = LadderConfig {
            oversight_address: address_var(
                "LADDER_OVERSIGHT_ADDRESS",
                DEFAULT_OVERSIGHT_ADDRESS,
            )?,
            executive_broadcast_address: address_var(
                "LADDER_EXECUTIVE_BROADCAST_ADDRESS",
                DEFAULT_EXECUTIVE_BROADCAST_ADDRESS,
            )?,
            facilities_address: address_var(
                "LADDER_FACILITIES_ADDRESS",
                DEFAULT_FACILITIES_ADDRESS,
            )?,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            ladder,
            roster: LadderRoster::default(),
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn address_var(var: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = env::var(var).unwrap_or_else(|_| default.to_string());
    let value = value.trim().to_string();
    if value.contains('@') {
        Ok(value)
    } else {
        Err(ConfigError::InvalidAddress { var, value })
    }
}

/// Fixed mailboxes the ladder writes to besides the employee and the ruling handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderConfig {
    /// Receives the heads-up sent by handlers running with notice.
    pub oversight_address: String,
    /// Receives the relay sent whenever a dossier entry is recorded.
    pub executive_broadcast_address: String,
    pub facilities_address: String,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            oversight_address: DEFAULT_OVERSIGHT_ADDRESS.to_string(),
            executive_broadcast_address: DEFAULT_EXECUTIVE_BROADCAST_ADDRESS.to_string(),
            facilities_address: DEFAULT_FACILITIES_ADDRESS.to_string(),
        }
    }
}

/// Staff seated on the four standard rungs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderRoster {
    pub receptionist: EmployeeRef,
    pub supervisor: EmployeeRef,
    pub hr_manager: EmployeeRef,
    pub ceo: EmployeeRef,
}

impl Default for LadderRoster {
    fn default() -> Self {
        Self {
            receptionist: EmployeeRef::new(2001, "Laura Medina", "laura@excuses.example"),
            supervisor: EmployeeRef::new(2002, "Pedro Alvarez", "pedro@excuses.example"),
            hr_manager: EmployeeRef::new(2003, "Sofia Ruiz", "sofia@excuses.example"),
            ceo: EmployeeRef::new(2004, "Roberto Diaz", "roberto@excuses.example"),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidAddress { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidAddress { var, value } => {
                write!(f, "{var} must be an e-mail address (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
