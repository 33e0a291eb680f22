//! Content-hash memoization for derived-view selectors.
//!
//! A [`Memo`] holds the last computed value keyed by a SHA-256 hash of the
//! serialized inputs. Recomputation happens only when the inputs change,
//! which gives selector behavior with ordinary pure functions.

use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct Memo<T> {
    entry: Option<(String, T)>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T: Clone> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value when `input` hashes to the same key as the
    /// previous call, otherwise run `compute` and cache its result.
    pub fn get_or_compute<I, F>(&mut self, input: &I, compute: F) -> T
    where
        I: Serialize + ?Sized,
        F: FnOnce() -> T,
    {
        let key = content_hash(input);
        if let Some((cached_key, value)) = &self.entry {
            if *cached_key == key {
                return value.clone();
            }
        }

        let value = compute();
        self.entry = Some((key, value.clone()));
        value
    }

    /// Drop the cached value; the next call recomputes.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

fn content_hash<I: Serialize + ?Sized>(input: &I) -> String {
    let json = serde_json::to_string(input).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex_encode(hasher.finalize())
}

fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    bytes
        .as_ref()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
