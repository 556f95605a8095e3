//! Server configuration
//!
//! Read from `FOOD_TRACKER_*` environment variables, with defaults for local use.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const ENV_DATABASE_PATH: &str = "FOOD_TRACKER_DATABASE_PATH";
pub const ENV_BIND_ADDR: &str = "FOOD_TRACKER_BIND_ADDR";
pub const ENV_SESSION_TTL_HOURS: &str = "FOOD_TRACKER_SESSION_TTL_HOURS";
pub const ENV_BCRYPT_COST: &str = "FOOD_TRACKER_BCRYPT_COST";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub session_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to read variables
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(ENV_DATABASE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let bind_addr = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            name: ENV_BIND_ADDR,
            value: bind_addr.clone(),
            reason: e.to_string(),
        })?;

        let session_ttl = match lookup(ENV_SESSION_TTL_HOURS) {
            Some(value) => {
                let hours = value.trim().parse::<i64>().ok();
                hours
                    .filter(|hours| (1..=MAX_SESSION_TTL_HOURS).contains(hours))
                    .and_then(chrono::Duration::try_hours)
                    .ok_or_else(|| ConfigError::Invalid {
                        name: ENV_SESSION_TTL_HOURS,
                        value,
                        reason: format!(
                            "expected a number of hours between 1 and {}",
                            MAX_SESSION_TTL_HOURS
                        ),
                    })?
            }
            None => chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        };

        let bcrypt_cost = match lookup(ENV_BCRYPT_COST) {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: ENV_BCRYPT_COST,
                        value,
                        reason: "expected an integer between 4 and 31".to_string(),
                    })
                }
            },
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_path,
            bind_addr,
            session_ttl,
            bcrypt_cost,
        })
    }
}

/// `<project root>/data/food_tracker.db`, where the project root is found by
/// walking up from `target/{debug,release}`
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("food_tracker.db");
    path
}
