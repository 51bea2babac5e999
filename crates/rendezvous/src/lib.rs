//! rendezvous: a counting permit that lets one thread wait until another
//! has reached a checkpoint.
//!
//! A signaler calls `signal()` once its setup is done (socket bound and
//! listening, say); the peer calls `wait()` before touching what that setup
//! produced. Each `signal()` adds one permit and each successful wait takes
//! one, so early signals accumulate rather than being lost.
//!
//! Two flavours share the contract:
//! - [`RendezvousFlag`] blocks OS threads on a condition variable.
//! - [`AsyncRendezvousFlag`] suspends tokio tasks.

mod async_flag;
mod error;
mod flag;

pub use async_flag::AsyncRendezvousFlag;
pub use error::{RendezvousError, Result};
pub use flag::{CloseGuard, RendezvousFlag};
