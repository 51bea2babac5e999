use std::time::Duration;

use thiserror::Error;

/// Why a wait returned without taking a permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RendezvousError {
    #[error("no signal received within {waited:?}")]
    Timeout { waited: Duration },

    #[error("rendezvous closed before a signal was received")]
    Closed,
}

pub type Result<T> = std::result::Result<T, RendezvousError>;
