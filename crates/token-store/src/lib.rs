//! Credential storage for bearer token pairs
//!
//! Holds the single active access/refresh token pair for a client instance.
//! The `TokenStore` trait is the seam between the request layer and wherever
//! tokens actually live; two implementations share the contract:
//!
//! - `NoopTokenStore` for contexts with no ambient session (server-rendered,
//!   unauthenticated calls)
//! - `FileTokenStore` for durable sessions, persisted to a JSON file
//!
//! Tokens are opaque strings. No expiry metadata is stored; the request layer
//! discovers expiry reactively when the backend answers 401.

pub mod error;
pub mod file;
pub mod pair;
pub mod store;

pub use error::{Error, Result};
pub use file::FileTokenStore;
pub use pair::TokenPair;
pub use store::{NoopTokenStore, TokenStore};
