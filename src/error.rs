//! Error taxonomy shared by every family (BDD and ADD alike), mirroring
//! `Cudd_ErrorType` in `cudd.h` member-for-member.
use thiserror::Error;

/// One of the closed set of failure kinds an operator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorKind {
    #[default]
    NoError,
    MemoryOut,
    TooManyNodes,
    MaxMemoryExceeded,
    TimeoutExpired,
    Termination,
    InvalidArgument,
    InternalError,
}

impl ErrorKind {
    pub fn is_error(self) -> bool {
        !matches!(self, ErrorKind::NoError)
    }
}

/// A failed operator result. Carries the [`ErrorKind`] plus, where useful,
/// a short human-readable context -- the manager's `last_error` field still
/// gets set for API parity with the C original (see `Manager::last_error`),
/// but callers on the Rust surface get this directly instead of having to
/// consult shared state after the fact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind:?}{}", context.as_deref().map(|c| format!(": {c}")).unwrap_or_default())]
pub struct DdError {
    pub kind: ErrorKind,
    pub context: Option<String>,
}

impl DdError {
    pub fn new(kind: ErrorKind) -> Self {
        DdError { kind, context: None }
    }

    pub fn with_context(kind: ErrorKind, context: impl Into<String>) -> Self {
        DdError { kind, context: Some(context.into()) }
    }
}

pub type Result<T> = std::result::Result<T, DdError>;
