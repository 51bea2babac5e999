use std::io;

use rendezvous::RendezvousError;
use thiserror::Error;

/// Why a case failed.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("{op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{op} succeeded but was expected to fail")]
    UnexpectedSuccess { op: &'static str },

    #[error("{op} failed with {actual:?}, expected {expected:?}")]
    UnexpectedErrorKind {
        op: &'static str,
        expected: io::ErrorKind,
        actual: io::ErrorKind,
    },

    #[cfg(unix)]
    #[error("{op} failed with {actual}, expected {expected}")]
    UnexpectedErrno {
        op: &'static str,
        expected: nix::errno::Errno,
        actual: nix::errno::Errno,
    },

    #[error("{what}: expected {expected}, got {actual}")]
    Mismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("rendezvous with server failed: {0}")]
    Rendezvous(#[from] RendezvousError),

    #[error("server signalled without publishing its address")]
    MissingAddress,

    #[error("{role} thread panicked")]
    Panicked { role: &'static str },
}

/// Attach the name of the socket call to an `io::Error`.
pub trait IoContext<T> {
    fn during(self, op: &'static str) -> Result<T, CaseError>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn during(self, op: &'static str) -> Result<T, CaseError> {
        self.map_err(|source| CaseError::Io { op, source })
    }
}

/// A call that must fail: returns its error, or `UnexpectedSuccess`.
pub fn expect_failure<T>(op: &'static str, result: io::Result<T>) -> Result<io::Error, CaseError> {
    match result {
        Ok(_) => Err(CaseError::UnexpectedSuccess { op }),
        Err(e) => Ok(e),
    }
}

/// A call that must fail with a specific error kind.
pub fn expect_error_kind<T>(
    op: &'static str,
    result: io::Result<T>,
    expected: io::ErrorKind,
) -> Result<(), CaseError> {
    let actual = expect_failure(op, result)?.kind();
    if actual == expected {
        Ok(())
    } else {
        Err(CaseError::UnexpectedErrorKind {
            op,
            expected,
            actual,
        })
    }
}

/// A raw socket call that must fail with a specific errno.
#[cfg(unix)]
pub fn expect_errno<T>(
    op: &'static str,
    result: nix::Result<T>,
    expected: nix::errno::Errno,
) -> Result<(), CaseError> {
    match result {
        Ok(_) => Err(CaseError::UnexpectedSuccess { op }),
        Err(actual) if actual == expected => Ok(()),
        Err(actual) => Err(CaseError::UnexpectedErrno {
            op,
            expected,
            actual,
        }),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown case '{0}'")]
    UnknownCase(String),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn during_names_the_call() {
        let result: io::Result<()> = Err(io::Error::from(io::ErrorKind::AddrInUse));
        let err = result.during("bind").unwrap_err();
        assert!(matches!(err, CaseError::Io { op: "bind", .. }));
        assert!(err.to_string().starts_with("bind failed:"));
    }

    #[test]
    fn expect_failure_rejects_success() {
        let err = expect_failure("connect", Ok(())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "connect succeeded but was expected to fail"
        );
    }

    #[test]
    fn expect_error_kind_checks_kind() {
        let refused: io::Result<()> = Err(io::ErrorKind::ConnectionRefused.into());
        assert!(expect_error_kind("connect", refused, io::ErrorKind::ConnectionRefused).is_ok());

        let reset: io::Result<()> = Err(io::ErrorKind::ConnectionReset.into());
        let err = expect_error_kind("connect", reset, io::ErrorKind::ConnectionRefused).unwrap_err();
        assert!(matches!(
            err,
            CaseError::UnexpectedErrorKind {
                actual: io::ErrorKind::ConnectionReset,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn expect_errno_checks_errno() {
        use nix::errno::Errno;

        assert!(expect_errno::<()>("accept", Err(Errno::EBADF), Errno::EBADF).is_ok());

        let err = expect_errno::<()>("accept", Err(Errno::ENOTSOCK), Errno::EBADF).unwrap_err();
        assert!(matches!(
            err,
            CaseError::UnexpectedErrno {
                actual: Errno::ENOTSOCK,
                ..
            }
        ));

        let err = expect_errno("accept", Ok(3), Errno::EBADF).unwrap_err();
        assert!(matches!(err, CaseError::UnexpectedSuccess { op: "accept" }));
    }

    #[test]
    fn rendezvous_errors_convert() {
        let err: CaseError = RendezvousError::Closed.into();
        assert_eq!(
            err.to_string(),
            "rendezvous with server failed: rendezvous closed before a signal was received"
        );
    }
}
