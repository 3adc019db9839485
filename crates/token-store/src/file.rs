//! Durable token storage backed by a JSON file
//!
//! The in-memory state is the source of truth; every write persists it using
//! atomic temp-file + rename to prevent corruption on crash. File permissions
//! are set to 0600 since the file contains bearer tokens.
//!
//! The `TokenStore` contract is infallible, so persistence failures are
//! logged and the in-memory state keeps serving reads. The next successful
//! write reconciles the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::store::TokenStore;

/// On-disk shape. Either token may be absent independently.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoredTokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// Token store persisted to a JSON file.
pub struct FileTokenStore {
    path: PathBuf,
    state: Mutex<StoredTokens>,
}

impl FileTokenStore {
    /// Load tokens from the given file path.
    ///
    /// A missing file is a cold start: the store begins empty and the file
    /// is created so future loads skip this path.
    pub fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = fs::read_to_string(&path)
                .map_err(|e| Error::Io(format!("reading token file: {e}")))?;
            let tokens: StoredTokens = serde_json::from_str(&contents)
                .map_err(|e| Error::Parse(format!("parsing token file: {e}")))?;
            info!(path = %path.display(), "loaded stored tokens");
            tokens
        } else {
            info!(path = %path.display(), "token file not found, starting with empty store");
            let tokens = StoredTokens::default();
            write_atomic(&path, &tokens)?;
            tokens
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Mutate the in-memory state and persist it.
    fn update(&self, apply: impl FnOnce(&mut StoredTokens)) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        apply(&mut state);
        if let Err(e) = write_atomic(&self.path, &state) {
            warn!(path = %self.path.display(), error = %e, "failed to persist tokens");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> Option<String> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.refresh.clone()
    }

    fn set_access_token(&self, token: String) {
        self.update(|state| state.access = Some(token));
    }

    fn set_refresh_token(&self, token: String) {
        self.update(|state| state.refresh = Some(token));
    }

    fn clear(&self) {
        debug!(path = %self.path.display(), "clearing stored tokens");
        self.update(|state| *state = StoredTokens::default());
    }
}

/// Write tokens to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target, so a crash mid-write cannot leave a corrupt file behind.
fn write_atomic(path: &Path, tokens: &StoredTokens) -> Result<()> {
    let json = serde_json::to_string_pretty(tokens)
        .map_err(|e| Error::Parse(format!("serializing tokens: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("token path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".tokens.tmp.{}", std::process::id()));

    fs::write(&tmp_path, json.as_bytes())
        .map_err(|e| Error::Io(format!("writing temp token file: {e}")))?;

    // 0600: the file holds bearer tokens (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(&tmp_path, perms)
            .map_err(|e| Error::Io(format!("setting token file permissions: {e}")))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| Error::Io(format!("renaming temp token file: {e}")))?;

    debug!(path = %path.display(), "persisted tokens");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::TokenPair;

    #[test]
    fn roundtrip_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = FileTokenStore::load(path.clone()).unwrap();
        store.set_pair(TokenPair::new("at_1", "rt_1"));

        // Load into a new store instance
        let store2 = FileTokenStore::load(path).unwrap();
        assert_eq!(store2.access_token().as_deref(), Some("at_1"));
        assert_eq!(store2.refresh_token().as_deref(), Some("rt_1"));
    }

    #[test]
    fn cold_start_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        assert!(!path.exists());
        let store = FileTokenStore::load(path.clone()).unwrap();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(path.exists());

        // The file must contain valid JSON representing the empty state
        let contents = fs::read_to_string(&path).unwrap();
        let parsed: StoredTokens = serde_json::from_str(&contents).unwrap();
        assert!(parsed.access.is_none());
        assert!(parsed.refresh.is_none());
    }

    #[test]
    fn clear_removes_both_tokens_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = FileTokenStore::load(path.clone()).unwrap();
        store.set_pair(TokenPair::new("at_1", "rt_1"));
        store.clear();

        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());

        let store2 = FileTokenStore::load(path).unwrap();
        assert!(store2.access_token().is_none());
        assert!(store2.refresh_token().is_none());
    }

    #[test]
    fn set_access_leaves_refresh_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = FileTokenStore::load(path).unwrap();
        store.set_pair(TokenPair::new("at_1", "rt_1"));
        store.set_access_token("at_2".into());

        assert_eq!(store.access_token().as_deref(), Some("at_2"));
        assert_eq!(store.refresh_token().as_deref(), Some("rt_1"));
    }

    #[test]
    fn set_pair_overwrites_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = FileTokenStore::load(path).unwrap();
        store.set_pair(TokenPair::new("at_1", "rt_1"));
        store.set_pair(TokenPair::new("at_2", "rt_2"));

        assert_eq!(store.access_token().as_deref(), Some("at_2"));
        assert_eq!(store.refresh_token().as_deref(), Some("rt_2"));
    }

    #[test]
    fn corrupt_file_returns_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{not-json").unwrap();

        let result = FileTokenStore::load(path);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");

        let store = FileTokenStore::load(path.clone()).unwrap();
        store.set_pair(TokenPair::new("at_1", "rt_1"));

        let metadata = fs::metadata(&path).unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "token file must be 0600, got {mode:o}");
    }

    #[test]
    fn concurrent_writes_dont_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let store = std::sync::Arc::new(FileTokenStore::load(path.clone()).unwrap());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.set_pair(TokenPair::new(format!("at_{i}"), format!("rt_{i}")));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Last writer wins; both fields must come from some complete pair
        let access = store.access_token().unwrap();
        let refresh = store.refresh_token().unwrap();
        assert!(access.starts_with("at_"));
        assert!(refresh.starts_with("rt_"));

        // File must be valid JSON
        let contents = fs::read_to_string(&path).unwrap();
        let _parsed: StoredTokens = serde_json::from_str(&contents).unwrap();
    }
}
