use std::net::{SocketAddr, ToSocketAddrs};

use crate::config::RunnerConfig;
use crate::error::{CaseError, IoContext};

pub const NAME: &str = "netdb";

pub fn run(config: &RunnerConfig) -> Result<(), CaseError> {
    let addrs: Vec<SocketAddr> = (config.resolve_host.as_str(), config.resolve_port)
        .to_socket_addrs()
        .during("getaddrinfo")?
        .collect();
    tracing::debug!(case = NAME, host = %config.resolve_host, ?addrs, "Resolved");

    let ipv4: Vec<&SocketAddr> = addrs.iter().filter(|a| a.is_ipv4()).collect();
    if ipv4.is_empty() {
        return Err(CaseError::Mismatch {
            what: "IPv4 addresses",
            expected: "at least one".to_string(),
            actual: format!("{addrs:?}"),
        });
    }

    if let Some(addr) = ipv4.iter().find(|a| a.port() != config.resolve_port) {
        return Err(CaseError::Mismatch {
            what: "resolved port",
            expected: config.resolve_port.to_string(),
            actual: addr.port().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numeric_host() {
        let config = RunnerConfig::default().with_resolve_host("127.0.0.1");
        let result = run(&config);
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn ipv6_only_result_is_a_mismatch() {
        let config = RunnerConfig::default().with_resolve_host("::1");
        let err = run(&config).unwrap_err();
        assert!(
            matches!(err, CaseError::Mismatch { what: "IPv4 addresses", .. }),
            "{err:?}"
        );
    }
}
