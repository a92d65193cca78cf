//! Error types.
//!
//! - [`VrftError`] is the library error: every estimation stage either
//!   succeeds or returns one of its three kinds, unchanged, to the caller.
//! - [`AppError`] is the binary's error: a message plus the process exit code.

use thiserror::Error;

/// Result alias for library operations.
pub type VrftResult<T> = Result<T, VrftError>;

/// Errors raised by the estimation pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VrftError {
    /// Wrong argument shape, mismatched lengths, degenerate or improper system,
    /// inconsistent initial conditions, empty basis.
    #[error("validation error: {0}")]
    Validation(String),

    /// Singular or ill-conditioned regression problem.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// A collaborator broke its contract (e.g. simulator output length).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a [`VrftError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Numerical,
    Internal,
}

impl VrftError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VrftError::Validation(_) => ErrorKind::Validation,
            VrftError::Numerical(_) => ErrorKind::Numerical,
            VrftError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<VrftError> for AppError {
    fn from(err: VrftError) -> Self {
        let exit_code = match err.kind() {
            ErrorKind::Validation => 2,
            ErrorKind::Numerical => 3,
            ErrorKind::Internal => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vrft_errors_map_to_exit_codes() {
        let v: AppError = VrftError::validation("bad").into();
        let n: AppError = VrftError::numerical("singular").into();
        let i: AppError = VrftError::internal("length").into();
        assert_eq!(v.exit_code(), 2);
        assert_eq!(n.exit_code(), 3);
        assert_eq!(i.exit_code(), 4);
        assert!(v.to_string().contains("bad"));
    }
}
