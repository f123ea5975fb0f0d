use cybulde_core::InvalidVerdict;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response is missing field `{0}`")]
    MissingField(&'static str),
    #[error("response field `{field}` is not {expected}")]
    FieldType {
        field: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    InvalidVerdict(#[from] InvalidVerdict),
}

/// Coarse failure class of a [`ServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unreachable endpoint, timeout, or non-2xx status.
    Transport,
    /// The service answered, but not with what the contract promises.
    Protocol,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Status { .. } => ErrorKind::Transport,
            Self::Json(_)
            | Self::MissingField(_)
            | Self::FieldType { .. }
            | Self::InvalidVerdict(_) => ErrorKind::Protocol,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_protocol(&self) -> bool {
        self.kind() == ErrorKind::Protocol
    }
}
