use thiserror::Error;

/// Errors raised while reading the caller identity handed over by the
/// upstream authenticator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing caller identity")]
    MissingIdentity,

    #[error("unknown caller role: {0}")]
    InvalidRole(String),
}
