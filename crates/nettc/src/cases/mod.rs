//! Built-in socket cases.
//!
//! Each case exercises one socket call against the loopback interface and
//! returns `Ok(())` when the call behaves as POSIX says it should.

mod accept;
mod byte_order;
mod connect;
mod netdb;
mod send;

use crate::config::RunnerConfig;
use crate::error::CaseError;

pub use byte_order::{network_to_host_u16, network_to_host_u32};
pub use send::GREETING;

pub type CaseFn = fn(&RunnerConfig) -> Result<(), CaseError>;

#[derive(Clone, Copy)]
pub struct Case {
    pub name: &'static str,
    pub description: &'static str,
    pub run: CaseFn,
}

impl std::fmt::Debug for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Case").field("name", &self.name).finish()
    }
}

pub const BUILTIN: &[Case] = &[
    Case {
        name: accept::NAME,
        description: "accept() one client, then fail on an empty non-blocking listener",
        run: accept::run,
    },
    Case {
        name: connect::NAME,
        description: "connect() to broadcast, unbound and zero ports must fail",
        run: connect::run,
    },
    Case {
        name: send::NAME,
        description: "send() a greeting that the client recv()s intact",
        run: send::run,
    },
    Case {
        name: byte_order::NAME,
        description: "ntohs()/ntohl() convert network to host byte order",
        run: byte_order::run,
    },
    Case {
        name: netdb::NAME,
        description: "getaddrinfo() resolves an IPv4 address for the service port",
        run: netdb::run,
    },
];
