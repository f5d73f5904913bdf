//! Connection and debug settings

use crate::debug::DEFAULT_MAX_LEN;
use serde::{Deserialize, Serialize};

/// Where and how to connect
///
/// Every field has a default, so a partial document (e.g. only `database`)
/// deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: Option<String>,
    pub charset: String,
    pub debug: DebugConfig,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: None,
            database: None,
            charset: "utf8mb4".to_string(),
            debug: DebugConfig::default(),
        }
    }
}

impl DbConfig {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = Some(password.into());
        self
    }

    pub fn debug(mut self, enabled: bool, max_len: usize) -> Self {
        self.debug = DebugConfig { enabled, max_len };
        self
    }
}

/// Statement logging settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Maximum logged payload length in bytes; 0 logs everything
    pub max_len: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}
