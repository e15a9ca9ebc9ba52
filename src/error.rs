use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum N26Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected http status: {0}")]
    Status(StatusCode),

    #[error("unexpected response from authentication request: {0}")]
    UnexpectedAuthResponse(StatusCode),

    #[error("failed to request mfa approval: {0}")]
    ChallengeRejected(StatusCode),

    #[error("login was not approved within the polling window")]
    ApprovalTimedOut,

    #[error("mfa approval denied: {0}")]
    ApprovalDenied(StatusCode),

    #[error("authentication attempt already finished, start a fresh one")]
    AttemptConsumed,

    #[error("invalid or unexpected response format")]
    InvalidResponse,

    #[error("invalid timestamp literal: {0:?}")]
    InvalidTimestamp(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
