//! Normalized error contract
//!
//! The backend answers with one of three incompatible error shapes: a
//! validation list, a typed domain error, or a generic message. `normalize`
//! decides the shape exactly once at the dispatch boundary so callers
//! pattern-match instead of probing fields defensively. Nothing above the
//! facade re-wraps these.

use serde::Deserialize;

use crate::constants::{GENERIC_ERROR_MESSAGE, domain_message};

/// Uniform error surfaced to every caller of the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Transport failures, unparseable bodies, and anything unrecognized.
    #[error("{message} (status {status})")]
    Generic { status: u16, message: String },

    /// 400 with per-field messages. The list passes through unjoined so
    /// callers can display each entry.
    #[error("validation failed: {messages:?}")]
    Validation { status: u16, messages: Vec<String> },

    /// Typed backend error; `kind` is carried through for programmatic
    /// branching in addition to the display message.
    #[error("{message}")]
    Domain {
        status: u16,
        kind: String,
        message: String,
    },

    /// The refresh cycle failed. Stored credentials have been cleared and
    /// the caller should treat the session as ended.
    #[error("session expired: {reason}")]
    SessionExpired { reason: String },
}

impl ApiError {
    /// HTTP status associated with the error.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Generic { status, .. }
            | ApiError::Validation { status, .. }
            | ApiError::Domain { status, .. } => *status,
            ApiError::SessionExpired { .. } => 401,
        }
    }

    pub(crate) fn generic(status: u16) -> Self {
        ApiError::Generic {
            status,
            message: GENERIC_ERROR_MESSAGE.into(),
        }
    }

    /// Map a transport failure (no response received) to the generic shape.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        Self::generic(err.status().map_or(500, |s| s.as_u16()))
    }
}

/// Lenient view of whatever error body the backend produced.
#[derive(Deserialize)]
struct RawErrorBody {
    #[serde(default)]
    message: Option<MessageField>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MessageField {
    One(String),
    Many(Vec<String>),
}

/// Map a non-2xx response body to the uniform error contract. Never fails.
///
/// Precedence: unparseable body → generic; 400 with a message list →
/// validation, list kept intact; recognized domain type → domain with the
/// table message and the tag carried through; otherwise generic with the
/// body's own message. A list-shaped message outside 400 is joined into the
/// generic message rather than promoted to a validation error.
pub fn normalize(status: u16, body: &[u8]) -> ApiError {
    let Ok(raw) = serde_json::from_slice::<RawErrorBody>(body) else {
        return ApiError::generic(status);
    };

    if status == 400 {
        if let Some(MessageField::Many(messages)) = &raw.message {
            return ApiError::Validation {
                status,
                messages: messages.clone(),
            };
        }
    }

    if let Some(kind) = raw.kind {
        if let Some(message) = domain_message(&kind) {
            return ApiError::Domain {
                status,
                kind,
                message: message.into(),
            };
        }
        // Unrecognized type tags fall through to the generic shape
    }

    let message = match raw.message {
        Some(MessageField::One(message)) => message,
        Some(MessageField::Many(messages)) => messages.join(", "),
        None => GENERIC_ERROR_MESSAGE.into(),
    };
    ApiError::Generic { status, message }
}
