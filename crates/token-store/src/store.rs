//! The storage seam between the request layer and wherever tokens live

use crate::pair::TokenPair;

/// Abstraction over where the credential pair lives.
///
/// The request layer only inspects presence vs absence; it never parses
/// tokens. Writes are last-writer-wins — a refresh always stores the newest
/// pair — so implementations need no locking beyond what their own storage
/// requires.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    fn set_access_token(&self, token: String);
    fn set_refresh_token(&self, token: String);

    /// Remove both tokens (sign-out, or refresh failure).
    fn clear(&self);

    /// Store a freshly issued pair.
    fn set_pair(&self, pair: TokenPair) {
        self.set_access_token(pair.access);
        self.set_refresh_token(pair.refresh);
    }
}

/// Store for contexts without an ambient session, e.g. server-rendered
/// public pages. Reads are always empty and writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTokenStore;

impl TokenStore for NoopTokenStore {
    fn access_token(&self) -> Option<String> {
        None
    }

    fn refresh_token(&self) -> Option<String> {
        None
    }

    fn set_access_token(&self, _token: String) {}

    fn set_refresh_token(&self, _token: String) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_store_reads_empty() {
        let store = NoopTokenStore;
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn noop_store_drops_writes() {
        let store = NoopTokenStore;
        store.set_pair(TokenPair::new("at_x", "rt_x"));
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }
}
