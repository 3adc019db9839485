//! Bearer-authenticated HTTP API client
//!
//! Attaches the stored access token to outgoing requests, discovers
//! credential expiry reactively through 401 responses, and recovers with a
//! single-flight refresh cycle that replays every request blocked behind it.
//!
//! Request flow:
//! 1. An `ApiClient` verb method builds a `RequestDescriptor`
//! 2. `Dispatcher::send` attaches the credential and `Origin` header and
//!    performs exactly one network call
//! 3. On 401 (authorized requests only), `RefreshCoordinator` runs — or
//!    joins — the one in-flight refresh and the request is resent once with
//!    the new token
//! 4. Any non-2xx outcome passes through `error::normalize` exactly once;
//!    callers always see the same `ApiError` shape

pub mod client;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod refresh;

pub use client::{ApiClient, ApiResponse};
pub use config::{Config, ConfigError};
pub use dispatch::{Dispatcher, RawResponse, RequestDescriptor};
pub use error::{ApiError, normalize};
pub use refresh::RefreshCoordinator;
