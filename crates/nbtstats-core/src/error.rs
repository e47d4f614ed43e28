//! Unified error type and exit codes for the CLI surface.
//!
//! Subsystems keep their own error enums next to their code; this module
//! bridges them into a single [`NbtStatsError`] with a small stable
//! exit-code mapping:
//! - `2`: invalid arguments (bad input from the caller)
//! - `3`: input/resolution errors (undecodable data, paths outside the root)
//! - `4`: write errors (disk full, permission denied, append mismatch)
//! - `10`: internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

use crate::ident::IdentError;
use crate::nbt::DecodeError;
use crate::paths::PathNotUnderRoot;
use crate::writer::WriteError;

/// Stable exit codes for CLI consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    /// Invalid arguments from the caller.
    InvalidArguments = 2,
    /// Input could not be resolved or decoded.
    InputError = 3,
    /// Output could not be written.
    WriteError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl ErrorCode {
    /// Numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Unified error type bridging every subsystem failure.
#[derive(Debug, Error)]
pub enum NbtStatsError {
    /// Invalid arguments from the caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Identifier resolution failure.
    #[error(transparent)]
    Ident(#[from] IdentError),

    /// Tag file decode failure.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Path-mapping precondition failure.
    #[error(transparent)]
    PathMap(#[from] PathNotUnderRoot),

    /// Persistence failure.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl NbtStatsError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        NbtStatsError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        NbtStatsError::Internal {
            message: message.into(),
        }
    }

    /// Exit code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            NbtStatsError::InvalidArguments { .. } | NbtStatsError::Ident(_) => {
                ErrorCode::InvalidArguments
            }
            NbtStatsError::Decode(_) | NbtStatsError::PathMap(_) => ErrorCode::InputError,
            NbtStatsError::Write(_) => ErrorCode::WriteError,
            NbtStatsError::Internal { .. } => ErrorCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn code_values_are_stable() {
        assert_eq!(ErrorCode::InvalidArguments.code(), 2);
        assert_eq!(ErrorCode::InputError.code(), 3);
        assert_eq!(ErrorCode::WriteError.code(), 4);
        assert_eq!(ErrorCode::InternalError.code(), 10);
    }

    #[test]
    fn subsystem_errors_map_to_their_codes() {
        let ident = NbtStatsError::from(IdentError::InvalidShape { len: 3 });
        assert_eq!(ident.code(), ErrorCode::InvalidArguments);

        let path = NbtStatsError::from(PathNotUnderRoot {
            path: PathBuf::from("/a"),
            root: PathBuf::from("/b"),
        });
        assert_eq!(path.code(), ErrorCode::InputError);

        assert_eq!(
            NbtStatsError::invalid_args("bad").code(),
            ErrorCode::InvalidArguments
        );
        assert_eq!(
            NbtStatsError::internal("boom").code(),
            ErrorCode::InternalError
        );
    }

    #[test]
    fn display_passes_subsystem_messages_through() {
        let err = NbtStatsError::from(IdentError::InvalidShape { len: 5 });
        assert_eq!(
            err.to_string(),
            "expected an array of four 32-bit integers, got 5 entries"
        );
    }
}
