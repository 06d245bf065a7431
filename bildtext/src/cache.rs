//! Content-addressed memoization of external service results.
//!
//! Keys are SHA-256 digests over the input bytes and every parameter that
//! influences the result, so identical uploads with identical settings are
//! answered without another API call.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Hex-encoded SHA-256 key identifying one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentKey(String);

impl ContentKey {
    /// Start a key for the given kind of request (e.g. "seo", "tts").
    pub fn builder(namespace: &str) -> ContentKeyBuilder {
        ContentKeyBuilder {
            hasher: Sha256::new(),
        }
        .bytes(namespace.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates the inputs of a [`ContentKey`].
pub struct ContentKeyBuilder {
    hasher: Sha256,
}

impl ContentKeyBuilder {
    /// Add raw input bytes.
    pub fn bytes(mut self, data: &[u8]) -> Self {
        // Length prefix keeps ("ab", "c") and ("a", "bc") apart
        self.hasher.update((data.len() as u64).to_le_bytes());
        self.hasher.update(data);
        self
    }

    /// Add a request parameter.
    pub fn param(self, value: &str) -> Self {
        self.bytes(value.as_bytes())
    }

    pub fn finish(self) -> ContentKey {
        ContentKey(format!("{:x}", self.hasher.finalize()))
    }
}

/// In-memory cache of results by content key.
pub struct ContentCache<V> {
    entries: Mutex<HashMap<ContentKey, V>>,
}

impl<V: Clone> ContentCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key`, if any.
    pub fn get(&self, key: &ContentKey) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Store a value, replacing any previous one.
    pub fn insert(&self, key: ContentKey, value: V) {
        self.lock().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ContentKey, V>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<V: Clone> Default for ContentCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
