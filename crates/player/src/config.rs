//! Client configuration from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `SCRAMBLE_PRIMARY_HOST` / `SCRAMBLE_PRIMARY_PORT` | `localhost` / `8080` |
//! | `SCRAMBLE_SECONDARY_HOST` / `SCRAMBLE_SECONDARY_PORT` | `localhost` / `8081` |
//! | `SCRAMBLE_RECONNECT_DELAY_MS` | `3000` |
//! | `SCRAMBLE_REQUEST_TIMEOUT_SECS` | unset (no timeout) |
//! | `SCRAMBLE_STORAGE_PATH` | platform config dir |
//! | `SCRAMBLE_USERNAME` / `SCRAMBLE_PLAYER_ID` | unset |
//! | `SCRAMBLE_MENU` | `continue` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use scramble_protocol::MenuChoice;
use thiserror::Error;

use crate::application::SessionTimings;
use crate::infrastructure::endpoints::{
    Endpoint, EndpointSet, DEFAULT_HOST, DEFAULT_PRIMARY_PORT, DEFAULT_SECONDARY_PORT,
};
use crate::infrastructure::websocket::RECONNECT_DELAY;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a port number, got {value:?}")]
    InvalidPort { var: &'static str, value: String },
    #[error("{var} must be a whole number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoints: EndpointSet,
    pub reconnect_delay: Duration,
    /// Per-attempt HTTP timeout; `None` leaves requests unbounded
    pub request_timeout: Option<Duration>,
    pub timings: SessionTimings,
    /// `None` selects the platform default location
    pub storage_path: Option<PathBuf>,
    /// Identity to seed into storage before starting
    pub username: Option<String>,
    pub player_id: Option<String>,
    pub menu_choice: MenuChoice,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointSet::default(),
            reconnect_delay: RECONNECT_DELAY,
            request_timeout: None,
            timings: SessionTimings::default(),
            storage_path: None,
            username: None,
            player_id: None,
            menu_choice: MenuChoice::Continue,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let primary = Endpoint::new(
            get("SCRAMBLE_PRIMARY_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            parse_port(
                "SCRAMBLE_PRIMARY_PORT",
                get("SCRAMBLE_PRIMARY_PORT"),
                DEFAULT_PRIMARY_PORT,
            )?,
        );
        let secondary = Endpoint::new(
            get("SCRAMBLE_SECONDARY_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            parse_port(
                "SCRAMBLE_SECONDARY_PORT",
                get("SCRAMBLE_SECONDARY_PORT"),
                DEFAULT_SECONDARY_PORT,
            )?,
        );

        let reconnect_delay = match get("SCRAMBLE_RECONNECT_DELAY_MS") {
            Some(value) => Duration::from_millis(parse_number("SCRAMBLE_RECONNECT_DELAY_MS", value)?),
            None => RECONNECT_DELAY,
        };
        let request_timeout = get("SCRAMBLE_REQUEST_TIMEOUT_SECS")
            .map(|value| parse_number("SCRAMBLE_REQUEST_TIMEOUT_SECS", value))
            .transpose()?
            .map(Duration::from_secs);

        let menu_choice = match get("SCRAMBLE_MENU") {
            Some(value) => MenuChoice::from_str(&value).map_err(|reason| {
                ConfigError::InvalidValue {
                    var: "SCRAMBLE_MENU",
                    reason,
                }
            })?,
            None => MenuChoice::Continue,
        };

        Ok(Self {
            endpoints: EndpointSet::new(primary, secondary),
            reconnect_delay,
            request_timeout,
            timings: SessionTimings::default(),
            storage_path: get("SCRAMBLE_STORAGE_PATH").map(PathBuf::from),
            username: get("SCRAMBLE_USERNAME"),
            player_id: get("SCRAMBLE_PLAYER_ID"),
            menu_choice,
        })
    }
}

fn parse_port(var: &'static str, value: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidPort { var, value }),
    }
}

fn parse_number(var: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { var, value })
}

/// Load `.env.local` then `.env` from the workspace root, if present.
///
/// Variables already set in the process environment win.
pub fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
