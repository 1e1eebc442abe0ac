use serde::Serialize;

use crate::lcapi::UpstreamError;

/// Everything a workflow can fail with, each variant carrying the message a
/// caller is allowed to see. Raw rusqlite/reqwest errors never cross this
/// boundary.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Duplicate unique field. `already_exists` lets a client offer a
    /// "log in instead" affordance for an already-claimed LeetCode handle.
    #[error("{message}")]
    Conflict { message: String, already_exists: bool },

    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    InvalidState(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Database error")]
    Storage(#[source] rusqlite::Error),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ServiceError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            already_exists: false,
        }
    }

    /// HTTP status an embedding router should respond with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Conflict { .. } => 409,
            Self::NotFound => 404,
            Self::InvalidState(_) => 400,
            Self::Upstream(_) => 400,
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// JSON body an embedding router should respond with.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            already_exists: match self {
                Self::Conflict { already_exists, .. } => Some(*already_exists),
                _ => None,
            },
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        log::error!("[ServiceError] Database failure: {err}");
        Self::Storage(err)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "alreadyExists", skip_serializing_if = "Option::is_none")]
    pub already_exists: Option<bool>,
}
