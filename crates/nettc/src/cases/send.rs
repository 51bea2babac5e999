use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};

use crate::config::RunnerConfig;
use crate::error::{CaseError, IoContext};
use crate::pair::{accept_within, run_pair};

pub const NAME: &str = "send";

pub const GREETING: &[u8] = b"Hello World !\n";

/// Receive buffer size on the client side.
const MAX_RECV_LEN: usize = 20;

pub fn run(config: &RunnerConfig) -> Result<(), CaseError> {
    let bind = config.server_addr();

    run_pair(
        NAME,
        config,
        move |rv| {
            let listener = TcpListener::bind(bind).during("bind")?;
            rv.publish(listener.local_addr().during("local_addr")?);

            let (mut stream, _) = accept_within(&listener, rv.wait_timeout())?;
            stream.write_all(GREETING).during("send")?;
            stream.shutdown(Shutdown::Write).during("shutdown")?;
            Ok(())
        },
        |rv| {
            let addr = rv.server_addr()?;
            let mut stream = TcpStream::connect(addr).during("connect")?;
            stream
                .set_read_timeout(Some(rv.wait_timeout()))
                .during("set_read_timeout")?;

            let received = recv_until_closed(&mut stream)?;
            if received != GREETING {
                return Err(CaseError::Mismatch {
                    what: "received bytes",
                    expected: String::from_utf8_lossy(GREETING).into_owned(),
                    actual: String::from_utf8_lossy(&received).into_owned(),
                });
            }
            Ok(())
        },
    )
}

/// Read until the peer closes or `MAX_RECV_LEN` bytes have arrived.
fn recv_until_closed(stream: &mut TcpStream) -> Result<Vec<u8>, CaseError> {
    let mut buf = [0u8; MAX_RECV_LEN];
    let mut len = 0;
    while len < buf.len() {
        match stream.read(&mut buf[len..]).during("recv")? {
            0 => break,
            n => len += n,
        }
    }
    Ok(buf[..len].to_vec())
}
