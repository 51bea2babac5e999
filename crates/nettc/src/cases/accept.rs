use std::io;
use std::net::{TcpListener, TcpStream};

use crate::config::RunnerConfig;
#[cfg(unix)]
use crate::error::expect_errno;
use crate::error::{CaseError, IoContext, expect_error_kind};
use crate::pair::{accept_within, run_pair};

pub const NAME: &str = "accept";

pub fn run(config: &RunnerConfig) -> Result<(), CaseError> {
    #[cfg(unix)]
    bad_descriptor_is_rejected()?;

    let bind = config.server_addr();
    run_pair(
        NAME,
        config,
        move |rv| {
            let listener = TcpListener::bind(bind).during("bind")?;
            rv.publish(listener.local_addr().during("local_addr")?);

            let (stream, peer) = accept_within(&listener, rv.wait_timeout())?;
            tracing::debug!(case = NAME, %peer, "Accepted client");
            drop(stream);

            // The only client has been taken; the listener is non-blocking now.
            expect_error_kind("accept", listener.accept(), io::ErrorKind::WouldBlock)
        },
        |rv| {
            let addr = rv.server_addr()?;
            TcpStream::connect(addr).during("connect")?;
            Ok(())
        },
    )
}

/// `accept` on a descriptor that was never opened.
#[cfg(unix)]
fn bad_descriptor_is_rejected() -> Result<(), CaseError> {
    expect_errno(
        "accept on invalid descriptor",
        nix::sys::socket::accept(-1),
        nix::errno::Errno::EBADF,
    )
}
