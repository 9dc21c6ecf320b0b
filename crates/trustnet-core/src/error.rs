use crate::models::TagError;
use thiserror::Error;

/// Domain errors returned by the core services.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("only the community owner can do this")]
    NotAuthorized,

    #[error("user is already a member of this community")]
    AlreadyMember,

    #[error("a join request is already pending")]
    AlreadyRequested,

    #[error("no pending join request for this user")]
    NoPendingRequest,

    #[error("ask has already been fulfilled")]
    AlreadyFulfilled,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Coarse classification used to pick a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Validation,
    Internal,
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) | Self::NotAuthorized => ErrorKind::Forbidden,
            Self::AlreadyMember
            | Self::AlreadyRequested
            | Self::NoPendingRequest
            | Self::AlreadyFulfilled => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl From<TagError> for CoreError {
    fn from(err: TagError) -> Self {
        Self::Validation(err.message().to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
