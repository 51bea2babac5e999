use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};

use crate::config::RunnerConfig;
#[cfg(unix)]
use crate::error::expect_errno;
use crate::error::{CaseError, IoContext, expect_error_kind, expect_failure};

pub const NAME: &str = "connect";

const TARGET_PORT: u16 = 1100;

pub fn run(config: &RunnerConfig) -> Result<(), CaseError> {
    #[cfg(unix)]
    bad_descriptor_is_rejected(config)?;
    broadcast_is_rejected(config)?;
    unbound_port_is_refused(config)?;
    port_zero_is_rejected(config)
}

/// `connect` on a descriptor that was never opened.
#[cfg(unix)]
fn bad_descriptor_is_rejected(config: &RunnerConfig) -> Result<(), CaseError> {
    use nix::sys::socket::{SockaddrIn, connect};
    use std::net::SocketAddrV4;

    let addr = SockaddrIn::from(SocketAddrV4::new(config.bind_ip, TARGET_PORT));
    expect_errno(
        "connect on invalid descriptor",
        connect(-1, &addr),
        nix::errno::Errno::EBADF,
    )
}

fn broadcast_is_rejected(config: &RunnerConfig) -> Result<(), CaseError> {
    let addr = SocketAddr::from((Ipv4Addr::BROADCAST, TARGET_PORT));
    let err = expect_failure(
        "connect to broadcast",
        TcpStream::connect_timeout(&addr, config.wait_timeout),
    )?;
    tracing::debug!(case = NAME, %addr, error = %err, "Broadcast connect rejected");
    Ok(())
}

fn unbound_port_is_refused(config: &RunnerConfig) -> Result<(), CaseError> {
    // Borrow a free port from the OS, then release it so nothing listens there.
    let addr = {
        let listener = TcpListener::bind((config.bind_ip, 0)).during("bind")?;
        listener.local_addr().during("local_addr")?
    };

    expect_error_kind(
        "connect to unbound port",
        TcpStream::connect_timeout(&addr, config.wait_timeout),
        io::ErrorKind::ConnectionRefused,
    )
}

fn port_zero_is_rejected(config: &RunnerConfig) -> Result<(), CaseError> {
    let addr = SocketAddr::from((config.bind_ip, 0));
    expect_failure("connect to port 0", TcpStream::connect(addr)).map(|_| ())
}
