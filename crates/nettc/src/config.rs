//! Runner configuration: defaults, then environment, then CLI flags.

use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RESOLVE_HOST: &str = "localhost";
pub const DEFAULT_RESOLVE_PORT: u16 = 9099;

pub const ENV_PORT: &str = "NETTC_PORT";
pub const ENV_WAIT_TIMEOUT_MS: &str = "NETTC_WAIT_TIMEOUT_MS";
pub const ENV_RESOLVE_HOST: &str = "NETTC_RESOLVE_HOST";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Address servers bind to.
    pub bind_ip: Ipv4Addr,
    /// Port servers bind to; 0 picks an ephemeral port per case.
    pub port: u16,
    /// Upper bound on every rendezvous wait and blocking accept/recv.
    pub wait_timeout: Duration,
    pub resolve_host: String,
    pub resolve_port: u16,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            bind_ip: Ipv4Addr::LOCALHOST,
            port: 0,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            resolve_host: DEFAULT_RESOLVE_HOST.to_string(),
            resolve_port: DEFAULT_RESOLVE_PORT,
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from defaults overridden by whatever `lookup` returns for each known variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_PORT) {
            config.port = parse_value(ENV_PORT, &value)?;
        }
        if let Some(value) = lookup(ENV_WAIT_TIMEOUT_MS) {
            config.wait_timeout = parse_timeout_ms(ENV_WAIT_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_RESOLVE_HOST) {
            if value.is_empty() {
                return Err(invalid(ENV_RESOLVE_HOST, &value));
            }
            config.resolve_host = value;
        }

        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_resolve_host(mut self, host: impl Into<String>) -> Self {
        self.resolve_host = host.into();
        self
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::from((self.bind_ip, self.port))
    }
}

pub(crate) fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

/// A wait timeout in milliseconds. Zero is rejected: every paired case would time out.
pub(crate) fn parse_timeout_ms(key: &str, value: &str) -> Result<Duration, ConfigError> {
    match parse_value::<u64>(key, value)? {
        0 => Err(invalid(key, value)),
        ms => Ok(Duration::from_millis(ms)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
