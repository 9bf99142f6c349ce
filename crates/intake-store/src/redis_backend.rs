//! Redis key-value backend
//!
//! Uses the synchronous connection API: one short-lived connection per
//! operation, no pooling.

use crate::StoreError;
use intake_domain::traits::KeyValueStore;
use redis::{Client, Commands, ErrorKind, RedisError};
use std::env;
use std::time::Duration;
use tracing::debug;

const ENV_REDIS_HOST: &str = "INTAKE_REDIS_HOST";
const ENV_REDIS_PORT: &str = "INTAKE_REDIS_PORT";

/// Default Redis host
pub const DEFAULT_REDIS_HOST: &str = "127.0.0.1";

/// Default Redis port
pub const DEFAULT_REDIS_PORT: u16 = 6379;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Where to find the Redis server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisSettings {
    /// Server host name or address
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_REDIS_HOST.to_string(),
            port: DEFAULT_REDIS_PORT,
        }
    }
}

impl RedisSettings {
    /// Read `INTAKE_REDIS_HOST` / `INTAKE_REDIS_PORT`, keeping `self` for unset
    /// or unparseable values
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = env::var(ENV_REDIS_HOST) {
            if !host.trim().is_empty() {
                self.host = host.trim().to_string();
            }
        }
        if let Some(port) = env::var(ENV_REDIS_PORT).ok().and_then(|p| p.trim().parse().ok()) {
            self.port = port;
        }
        self
    }

    /// Connection URL, database 0
    pub fn url(&self) -> String {
        format!("redis://{}:{}/0", self.host, self.port)
    }
}

/// `KeyValueStore` backed by a Redis server
#[derive(Debug, Clone)]
pub struct RedisBackend {
    client: Client,
}

impl RedisBackend {
    /// Create a client for the given server
    ///
    /// No connection is made here; use `ping` to check reachability.
    pub fn open(settings: &RedisSettings) -> Result<Self, StoreError> {
        debug!(host = %settings.host, port = settings.port, "Opening Redis client");
        let client = Client::open(settings.url())?;
        Ok(Self { client })
    }

    fn connection(&self) -> Result<redis::Connection, StoreError> {
        Ok(self.client.get_connection_with_timeout(CONNECT_TIMEOUT)?)
    }
}

impl KeyValueStore for RedisBackend {
    type Error = StoreError;

    fn ping(&self) -> Result<(), Self::Error> {
        let mut conn = self.connection()?;
        let _: String = redis::cmd("PING").query(&mut conn)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let mut conn = self.connection()?;
        let raw: Option<Vec<u8>> = conn.get(key).map_err(|e| read_error(key, e))?;
        Ok(raw.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut conn = self.connection()?;
        let _: () = conn.set(key, value)?;
        Ok(())
    }
}

/// A value of the wrong type is a property of the key, not of the server
fn read_error(key: &str, e: RedisError) -> StoreError {
    if e.kind() == ErrorKind::TypeError || e.code() == Some("WRONGTYPE") {
        StoreError::CorruptValue(format!("{}: {}", key, e))
    } else {
        StoreError::Redis(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RedisSettings::default();
        assert_eq!(settings.url(), "redis://127.0.0.1:6379/0");
    }

    #[test]
    fn test_read_error_classification() {
        let wrong_type = RedisError::from((ErrorKind::TypeError, "Response was of incompatible type"));
        let err = read_error("conversation:x", wrong_type);
        assert!(err.is_corrupt_value());
        assert!(err.to_string().contains("conversation:x"));

        let io = RedisError::from((ErrorKind::IoError, "connection refused"));
        assert!(matches!(read_error("conversation:x", io), StoreError::Redis(_)));
    }

    #[test]
    fn test_open_does_not_connect() {
        let settings = RedisSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
        };
        let backend = RedisBackend::open(&settings).unwrap();
        assert!(backend.ping().is_err());
    }
}
