//! Wire-contract constants
//!
//! The refresh endpoint is the only hardcoded network contract this client
//! depends on; every other path is caller-supplied and resolved against the
//! configured base URL.

/// Path of the token refresh endpoint, relative to the API base URL.
pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";

/// Fallback message when the backend gives us nothing usable.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Display messages for known backend domain error types.
///
/// Callers still receive the raw type tag for programmatic branching (e.g.
/// redirecting to a top-up flow on `insufficient_balance`); this table only
/// decides what gets shown to the user.
pub const DOMAIN_ERROR_MESSAGES: &[(&str, &str)] = &[
    (
        "insufficient_balance",
        "Your balance is too low to complete this purchase.",
    ),
    ("ticket_sold_out", "This ticket is sold out."),
    (
        "duplicate_purchase",
        "You have already purchased this ticket.",
    ),
    ("cart_expired", "Your cart has expired. Please start over."),
    ("post_locked", "This post is locked and cannot be edited."),
];

/// Look up the display message for a domain error type, if known.
pub fn domain_message(kind: &str) -> Option<&'static str> {
    DOMAIN_ERROR_MESSAGES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, message)| *message)
}
