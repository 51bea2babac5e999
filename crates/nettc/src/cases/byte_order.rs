use std::fmt::LowerHex;

use crate::config::RunnerConfig;
use crate::error::CaseError;

pub const NAME: &str = "byte_order";

const SHORT_NETWORK: u16 = 0x1012;
const SHORT_SWAPPED: u16 = 0x1210;
const LONG_NETWORK: u32 = 0x0112_A380;
const LONG_SWAPPED: u32 = 0x80A3_1201;

/// `ntohs`
pub fn network_to_host_u16(value: u16) -> u16 {
    u16::from_be(value)
}

/// `ntohl`
pub fn network_to_host_u32(value: u32) -> u32 {
    u32::from_be(value)
}

pub fn run(_config: &RunnerConfig) -> Result<(), CaseError> {
    check(
        "ntohs",
        network_to_host_u16(SHORT_NETWORK),
        host_order(SHORT_NETWORK, SHORT_SWAPPED),
    )?;
    check(
        "ntohl",
        network_to_host_u32(LONG_NETWORK),
        host_order(LONG_NETWORK, LONG_SWAPPED),
    )?;
    check(
        "htons/ntohs round trip",
        network_to_host_u16(SHORT_NETWORK.to_be()),
        SHORT_NETWORK,
    )?;
    check(
        "htonl/ntohl round trip",
        network_to_host_u32(LONG_NETWORK.to_be()),
        LONG_NETWORK,
    )
}

/// The value a network-order `network` should read as on this host.
fn host_order<T>(network: T, swapped: T) -> T {
    if cfg!(target_endian = "little") {
        swapped
    } else {
        network
    }
}

fn check<T>(what: &'static str, actual: T, expected: T) -> Result<(), CaseError>
where
    T: PartialEq + LowerHex,
{
    if actual == expected {
        Ok(())
    } else {
        Err(CaseError::Mismatch {
            what,
            expected: format!("{expected:#x}"),
            actual: format!("{actual:#x}"),
        })
    }
}
