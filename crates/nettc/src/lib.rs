//! nettc: loopback socket API cases whose server and client threads are
//! ordered by a rendezvous flag.

pub mod cases;
pub mod cli;
pub mod config;
mod error;
pub mod logging;
pub mod pair;
mod report;
mod runner;

pub use cases::{BUILTIN, Case, CaseFn};
pub use config::RunnerConfig;
pub use error::{CaseError, ConfigError, IoContext, expect_error_kind, expect_failure};
pub use report::{CaseOutcome, CaseStatus, RunReport};
pub use runner::Suite;
