//! Error types for fmtuner.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Bus-layer, chip-layer, and
//! application-layer errors are all captured here.

/// The error type for all fmtuner operations.
///
/// Variants cover the failure modes encountered when talking to a receiver
/// chip over a register bus: failed bus transactions, identity mismatches at
/// startup, scan timeouts, and unsupported capabilities.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A bus-level error (failed I2C transaction).
    #[error("bus error: {0}")]
    Bus(String),

    /// The chip identity register did not hold the expected value.
    ///
    /// Raised during driver initialization only. It typically means the
    /// wrong device is wired at the configured bus address.
    #[error("chip identity mismatch: expected {expected:#04x}, read {found:#04x}")]
    IdMismatch {
        /// The identity value the driver expects.
        expected: u8,
        /// The value actually read from the identity register.
        found: u8,
    },

    /// Timed out waiting for the chip to finish an operation.
    ///
    /// For a channel scan this means the auto-scan hardware never reported
    /// completion within the poll budget; the tuned frequency is unchanged.
    #[error("timeout waiting for hardware")]
    Timeout,

    /// The requested operation is not supported by this tuner driver.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An invalid parameter was passed to a tuner operation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The register bus has not been opened, or has been closed.
    #[error("bus not open")]
    NotOpen,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_bus() {
        let e = Error::Bus("transaction failed".into());
        assert_eq!(e.to_string(), "bus error: transaction failed");
    }

    #[test]
    fn error_display_id_mismatch() {
        let e = Error::IdMismatch {
            expected: 0x84,
            found: 0xFF,
        };
        assert_eq!(
            e.to_string(),
            "chip identity mismatch: expected 0x84, read 0xff"
        );
    }

    #[test]
    fn error_display_timeout() {
        let e = Error::Timeout;
        assert_eq!(e.to_string(), "timeout waiting for hardware");
    }

    #[test]
    fn error_display_unsupported() {
        let e = Error::Unsupported("SNR reading".into());
        assert_eq!(e.to_string(), "unsupported operation: SNR reading");
    }

    #[test]
    fn error_display_invalid_parameter() {
        let e = Error::InvalidParameter("volume level 9".into());
        assert_eq!(e.to_string(), "invalid parameter: volume level 9");
    }

    #[test]
    fn error_display_not_open() {
        let e = Error::NotOpen;
        assert_eq!(e.to_string(), "bus not open");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no access");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("no access"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }
}
