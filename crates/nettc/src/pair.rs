//! Server/client thread pair ordered by a rendezvous flag.
//!
//! The server binds and listens, publishes its address and signals; the
//! client waits for that signal before connecting. If the server returns or
//! unwinds without signalling, the flag is closed and the client fails
//! with `Closed` instead of waiting out its timeout.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rendezvous::RendezvousFlag;

use crate::config::RunnerConfig;
use crate::error::{CaseError, IoContext};

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// State shared by the two roles of a case.
#[derive(Debug)]
pub struct Rendezvous {
    flag: RendezvousFlag,
    addr: OnceLock<SocketAddr>,
    wait_timeout: Duration,
}

impl Rendezvous {
    fn new(case: &'static str, wait_timeout: Duration) -> Self {
        Self {
            flag: RendezvousFlag::labeled(case),
            addr: OnceLock::new(),
            wait_timeout,
        }
    }

    /// Server side: make `addr` visible to the client, then signal.
    pub fn publish(&self, addr: SocketAddr) {
        if self.addr.set(addr).is_err() {
            tracing::warn!(flag = self.flag.label(), %addr, "Server address already published");
        }
        self.flag.signal();
    }

    /// Client side: wait for the server's signal and return its address.
    pub fn server_addr(&self) -> Result<SocketAddr, CaseError> {
        self.flag.wait_timeout(self.wait_timeout)?;
        self.addr.get().copied().ok_or(CaseError::MissingAddress)
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }
}

/// Run `server` and `client` on their own threads and join both.
///
/// The server's error wins if both fail, since a server failure usually
/// explains the client's.
pub fn run_pair<S, C>(
    case: &'static str,
    config: &RunnerConfig,
    server: S,
    client: C,
) -> Result<(), CaseError>
where
    S: FnOnce(&Rendezvous) -> Result<(), CaseError> + Send + 'static,
    C: FnOnce(&Rendezvous) -> Result<(), CaseError> + Send + 'static,
{
    let shared = Arc::new(Rendezvous::new(case, config.wait_timeout));

    let server = spawn_role(case, "server", Arc::clone(&shared), move |rv| {
        let _close = rv.flag.close_on_drop();
        server(rv)
    })?;

    let client = match spawn_role(case, "client", Arc::clone(&shared), client) {
        Ok(handle) => handle,
        Err(e) => {
            // Nobody will connect; let the server's accept time out.
            let _ = join_role(case, "server", server);
            return Err(e);
        }
    };

    let server_result = join_role(case, "server", server);
    let client_result = join_role(case, "client", client);
    server_result.and(client_result)
}

fn spawn_role<F>(
    case: &'static str,
    role: &'static str,
    shared: Arc<Rendezvous>,
    body: F,
) -> Result<JoinHandle<Result<(), CaseError>>, CaseError>
where
    F: FnOnce(&Rendezvous) -> Result<(), CaseError> + Send + 'static,
{
    thread::Builder::new()
        .name(format!("{case}-{role}"))
        .spawn(move || body(&shared))
        .during("thread spawn")
}

fn join_role(
    case: &'static str,
    role: &'static str,
    handle: JoinHandle<Result<(), CaseError>>,
) -> Result<(), CaseError> {
    let result = handle.join().unwrap_or(Err(CaseError::Panicked { role }));
    if let Err(e) = &result {
        tracing::debug!(case, role, error = %e, "Role failed");
    }
    result
}

/// Accept one connection, giving up after `timeout`.
///
/// Leaves the listener non-blocking; the returned stream is blocking.
pub fn accept_within(
    listener: &TcpListener,
    timeout: Duration,
) -> Result<(TcpStream, SocketAddr), CaseError> {
    listener.set_nonblocking(true).during("set_nonblocking")?;
    let deadline = Instant::now().checked_add(timeout);

    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                stream.set_nonblocking(false).during("set_nonblocking")?;
                return Ok((stream, peer));
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    return Err(CaseError::Io {
                        op: "accept",
                        source: io::Error::new(
                            io::ErrorKind::TimedOut,
                            format!("no client connected within {timeout:?}"),
                        ),
                    });
                }
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(CaseError::Io { op: "accept", source: e }),
        }
    }
}
