//! The access/refresh credential pair

use serde::{Deserialize, Serialize};

/// A bearer credential pair issued at sign-in, sign-up, or refresh.
///
/// Both tokens are opaque; the client never parses them or inspects expiry.
/// The pair is overwritten wholesale on every successful refresh and cleared
/// on refresh failure or sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token attached as `Authorization: Bearer <token>`
    pub access: String,
    /// Longer-lived token exchanged for a new pair when access is rejected
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}
