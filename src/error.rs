//! Error codes for the sticky error register.
//!
//! Commands never panic and never return errors directly; a failed guard
//! records its code in the register and the command returns silently. The
//! register keeps the *first* failure until it is read.

use thiserror::Error;

/// Result code of the last failed command.
///
/// The `Display` implementation provides the human-readable description of
/// each code.
#[derive(Error, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Error {
    #[default]
    #[error("operation succeeded")]
    NoError,
    #[error("invalid argument(s) to a call")]
    InvalidValue,
    #[error("invalid enumeration argument(s) to a call")]
    InvalidEnum,
    #[error("invalid call")]
    InvalidOperation,
    #[error("quota of internal resources exceeded")]
    OutOfResources,
    #[error("internal library error")]
    InternalError,
    #[error("matrix stack overflow")]
    StackOverflow,
    #[error("matrix stack underflow")]
    StackUnderflow,
    #[error("insufficient memory to finish the requested operation")]
    OutOfMemory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_code_table() {
        assert_eq!(Error::NoError.to_string(), "operation succeeded");
        assert_eq!(Error::StackUnderflow.to_string(), "matrix stack underflow");
        assert_eq!(
            Error::InvalidEnum.to_string(),
            "invalid enumeration argument(s) to a call"
        );
    }
}
