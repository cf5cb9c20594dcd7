//! Runtime configuration read from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HOST` | `127.0.0.1` | bind address |
//! | `PORT` | `3000` | bind port |
//! | `DATABASE_URL` | `memory` | `memory`, or a `sqlite:` URL |
//! | `RUST_LOG` | see [`DEFAULT_LOG_FILTER`] | tracing filter directives |

use thiserror::Error;

pub const DEFAULT_LOG_FILTER: &str = "todo_server=info,todo_core=info,tower_http=info";

/// `DATABASE_URL` value selecting process-local storage.
pub const MEMORY_DATABASE: &str = "memory";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("DATABASE_URL must be \"memory\" or a sqlite: URL, got {0:?}")]
    UnsupportedDatabase(String),
}

/// Where todos are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: Storage,
    pub log_filter: String,
}

impl Config {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 3000,
        };

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| MEMORY_DATABASE.to_string());
        let storage = if database_url == MEMORY_DATABASE {
            Storage::Memory
        } else if database_url.starts_with("sqlite:") {
            Storage::Sqlite(database_url)
        } else {
            return Err(ConfigError::UnsupportedDatabase(database_url));
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            storage,
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
