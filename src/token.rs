//! Bearer-token storage.
//!
//! The session token is the only piece of mutable shared state in the SDK.
//! All components depend on the [`TokenStore`] trait rather than any ambient
//! storage, so tests can swap in an in-memory fake and native hosts can pick
//! a persistent backing.
//!
//! Every write bumps a monotonic generation counter. The HTTP client
//! snapshots the generation when it attaches a bearer header; a later 401
//! clears the store only if no newer token has been written in the
//! meantime, so a login racing a stale 401 keeps its token.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// A stored token together with the store generation it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSnapshot {
    /// The opaque bearer token, if one is stored.
    pub token: Option<String>,
    /// Store generation at the time of the read.
    pub generation: u64,
}

/// Storage for a single bearer token.
///
/// Implementations must never panic or surface storage failures to the
/// caller: a failed read behaves as "no token", a failed write is logged
/// and dropped. Presence of a token does not imply validity; only a
/// successful verify call establishes that.
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Read the current token and generation.
    fn snapshot(&self) -> TokenSnapshot;

    /// Store a new token, bumping the generation.
    fn set(&self, token: &str);

    /// Remove the token unconditionally, bumping the generation.
    fn clear(&self);

    /// Remove the token only if the store is still at `generation`.
    ///
    /// Returns `true` if the token was cleared.
    fn clear_if_current(&self, generation: u64) -> bool;

    /// Read the current token.
    fn get(&self) -> Option<String> {
        self.snapshot().token
    }
}

#[derive(Debug, Default)]
struct Slot {
    token: Option<String>,
    generation: u64,
}

/// In-memory token store.
///
/// The default store for tests and short-lived processes.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<RwLock<Slot>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn snapshot(&self) -> TokenSnapshot {
        match self.slot.read() {
            Ok(slot) => TokenSnapshot {
                token: slot.token.clone(),
                generation: slot.generation,
            },
            Err(_) => TokenSnapshot {
                token: None,
                generation: 0,
            },
        }
    }

    fn set(&self, token: &str) {
        if let Ok(mut slot) = self.slot.write() {
            slot.token = Some(token.to_string());
            slot.generation += 1;
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.write() {
            slot.token = None;
            slot.generation += 1;
        }
    }

    fn clear_if_current(&self, generation: u64) -> bool {
        if let Ok(mut slot) = self.slot.write() {
            if slot.generation == generation {
                slot.token = None;
                slot.generation += 1;
                return true;
            }
        }
        false
    }
}

/// Token store persisted to a file.
///
/// The browser original keeps the token in local storage; a native client
/// keeps it in a file under the same contract. All I/O failures are logged
/// and swallowed: the store then behaves as if empty.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    slot: Arc<RwLock<Slot>>,
}

impl FileTokenStore {
    /// Open a store backed by `path`, loading any previously saved token.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "No saved token loaded");
                None
            }
        };
        Self {
            path,
            slot: Arc::new(RwLock::new(Slot {
                token,
                generation: 0,
            })),
        }
    }

    fn persist(&self, token: Option<&str>) {
        let result = match token {
            Some(token) => std::fs::write(&self.path, token),
            None => match std::fs::remove_file(&self.path) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err),
                _ => Ok(()),
            },
        };
        if let Err(err) = result {
            tracing::warn!(path = %self.path.display(), error = %err, "Failed to persist token state");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn snapshot(&self) -> TokenSnapshot {
        match self.slot.read() {
            Ok(slot) => TokenSnapshot {
                token: slot.token.clone(),
                generation: slot.generation,
            },
            Err(_) => TokenSnapshot {
                token: None,
                generation: 0,
            },
        }
    }

    fn set(&self, token: &str) {
        if let Ok(mut slot) = self.slot.write() {
            slot.token = Some(token.to_string());
            slot.generation += 1;
        }
        self.persist(Some(token));
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.write() {
            slot.token = None;
            slot.generation += 1;
        }
        self.persist(None);
    }

    fn clear_if_current(&self, generation: u64) -> bool {
        let cleared = match self.slot.write() {
            Ok(mut slot) if slot.generation == generation => {
                slot.token = None;
                slot.generation += 1;
                true
            }
            _ => false,
        };
        if cleared {
            self.persist(None);
        }
        cleared
    }
}
