//! Decoded-image cache for repeated inputs.
//!
//! Decoding is the expensive half of reading an input. When the same bytes
//! show up more than once in a batch (the same sprite dropped twice, a
//! directory containing copies), the orchestrator can reuse the decoded
//! handle instead of decoding again.
//!
//! # Design
//!
//! The cache is an injected [`DecodeCache`] owned by the caller of
//! [`process_batch`](crate::process::process_batch); there is no process-wide
//! state. Two policies ship:
//!
//! - [`NoCache`]: every lookup misses. The default.
//! - [`LruCache`]: bounded, evicts the least recently used entry once
//!   `capacity` entries are held.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: keys are the SHA-256 of the complete
//! input bytes ([`content_key`]), never the path or the display name. Two
//! files with identical content share an entry; a file edited between two
//! batches misses. A cached handle is the same value a fresh decode would
//! produce, so using the cache never changes output bytes.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Storage for decoded images keyed by [`content_key`].
pub trait DecodeCache<I> {
    /// Return a copy of the cached value and mark it as recently used.
    fn get(&mut self, key: &str) -> Option<I>;

    fn insert(&mut self, key: String, value: I);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether lookups can ever hit. When false, callers skip hashing the
    /// input and copying the decoded value.
    fn enabled(&self) -> bool {
        true
    }
}

/// SHA-256 of `bytes`, returned as a hex string.
pub fn content_key(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl<I> DecodeCache<I> for NoCache {
    fn get(&mut self, _key: &str) -> Option<I> {
        None
    }

    fn insert(&mut self, _key: String, _value: I) {}

    fn len(&self) -> usize {
        0
    }

    fn enabled(&self) -> bool {
        false
    }
}

/// Bounded least-recently-used cache.
#[derive(Debug)]
pub struct LruCache<I> {
    entries: HashMap<String, I>,
    /// Keys from least to most recently used.
    order: VecDeque<String>,
    capacity: usize,
}

impl<I> LruCache<I> {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key)
            && let Some(k) = self.order.remove(pos)
        {
            self.order.push_back(k);
        }
    }
}

impl<I: Clone> DecodeCache<I> for LruCache<I> {
    fn get(&mut self, key: &str) -> Option<I> {
        let value = self.entries.get(key)?.clone();
        self.touch(key);
        Some(value)
    }

    fn insert(&mut self, key: String, value: I) {
        if self.entries.contains_key(&key) {
            self.touch(&key);
        } else {
            if self.entries.len() >= self.capacity
                && let Some(oldest) = self.order.pop_front()
            {
                self.entries.remove(&oldest);
            }
            self.order.push_back(key.clone());
        }
        self.entries.insert(key, value);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Build the cache for a configured capacity: `0` disables caching.
pub fn with_capacity<I: Clone + 'static>(capacity: usize) -> Box<dyn DecodeCache<I>> {
    if capacity == 0 {
        Box::new(NoCache)
    } else {
        Box::new(LruCache::new(capacity))
    }
}

/// Summary of cache use for a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} decoded ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} decoded", self.misses)
        }
    }
}
