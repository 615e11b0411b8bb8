use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use sched_core::{EngineSettings, MAX_BUDGET};
use thiserror::Error;

const HOST: &str = "TIMETABLE__SERVER__HOST";
const PORT: &str = "TIMETABLE__SERVER__PORT";
const BUDGET_SECS: &str = "TIMETABLE__ENGINE__BUDGET_SECS";
const STRATEGY_LIMIT: &str = "TIMETABLE__ENGINE__STRATEGY_LIMIT";
const CATALOG: &str = "TIMETABLE__DATA__CATALOG";
const LOG_JSON: &str = "TIMETABLE__LOG__JSON";

const MAX_BUDGET_SECS: u64 = MAX_BUDGET.as_secs();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value} is invalid: expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Process settings, read from `TIMETABLE__*` variables.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub engine: EngineSettings,
    /// Catalog snapshot to serve; `None` starts with an empty catalog.
    pub catalog: Option<PathBuf>,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            engine: EngineSettings::default(),
            catalog: None,
            json_logs: true,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = match read(HOST) {
            Some(v) => parse(HOST, v, "an IPv4 or IPv6 address")?,
            None => defaults.host,
        };
        let port = match read(PORT) {
            Some(v) => parse(PORT, v, "a port number")?,
            None => defaults.port,
        };
        let budget = match read(BUDGET_SECS) {
            Some(v) => {
                const EXPECTED: &str = "whole seconds between 1 and 86400";
                match parse::<u64>(BUDGET_SECS, v.clone(), EXPECTED)? {
                    secs @ 1..=MAX_BUDGET_SECS => Duration::from_secs(secs),
                    _ => {
                        return Err(ConfigError::Invalid {
                            key: BUDGET_SECS,
                            value: v,
                            expected: EXPECTED,
                        })
                    }
                }
            }
            None => defaults.engine.budget,
        };
        let strategy_limit = match read(STRATEGY_LIMIT) {
            Some(v) => match parse::<usize>(STRATEGY_LIMIT, v, "a non-negative integer")? {
                0 => None,
                n => Some(n),
            },
            None => defaults.engine.strategy_limit,
        };
        let json_logs = match read(LOG_JSON) {
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: LOG_JSON,
                        value: v,
                        expected: "true or false",
                    })
                }
            },
            None => defaults.json_logs,
        };

        Ok(Self {
            host,
            port,
            engine: EngineSettings {
                strategy_limit,
                budget,
            },
            catalog: read(CATALOG).map(PathBuf::from),
            json_logs,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Requests may run a full generation, so they get a little longer than
    /// the engine budget.
    pub fn request_timeout(&self) -> Duration {
        self.engine.budget.saturating_add(Duration::from_secs(10))
    }
}

fn parse<T: std::str::FromStr>(
    key: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value,
        expected,
    })
}
