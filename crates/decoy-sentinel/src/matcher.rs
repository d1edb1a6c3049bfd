//! Router-side lookup of sentinels in observed traffic.
//!
//! A decoy router derives the sentinels of all registered keys for the
//! windows it accepts and looks for their search patterns in passing
//! payloads. A hit identifies the key and sequence number that tagged the
//! flow.

use std::{collections::HashMap, sync::Arc};

use log::{debug, warn};

use crate::{
    error::{Error, Result},
    generator::{SentinelGenerator, SentinelRecord, Sentinels},
    keyfile::KeyFile,
    sentinel::{SENTINEL_LEN, Sentinel},
    window::Window,
};

/// What a search pattern maps back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelMatch {
    pub key_index: Arc<str>,
    pub sequence: u64,
    /// The window the matching sentinel belongs to.
    pub window: Window,
    pub sentinel: Sentinel,
    /// Byte offset of the search pattern in the scanned payload.
    pub offset: usize,
}

#[derive(Debug, Clone)]
struct Entry {
    key_index: Arc<str>,
    sequence: u64,
    window: Window,
    sentinel: Sentinel,
}

/// Search patterns of one or more windows, indexed for lookup.
#[derive(Debug, Clone)]
pub struct SentinelTable {
    pattern_len: usize,
    patterns: HashMap<Box<[u8]>, Entry>,
}

impl SentinelTable {
    /// An empty table for search patterns of `pattern_len` bytes.
    pub fn new(pattern_len: usize) -> Result<Self> {
        if !(1..=SENTINEL_LEN).contains(&pattern_len) {
            return Err(Error::InvalidArgument(format!(
                "search pattern length must be between 1 and {SENTINEL_LEN} bytes, got {pattern_len}"
            )));
        }
        Ok(SentinelTable {
            pattern_len,
            patterns: HashMap::new(),
        })
    }

    /// Build a table holding every sentinel of `keys` in each of `windows`.
    /// Use [`Window::skew_tolerant`] to accept clients whose clocks are off by
    /// up to one window.
    pub fn for_windows(
        generator: &SentinelGenerator,
        keys: &KeyFile,
        sentinels_per_key: u64,
        windows: &[Window],
    ) -> Result<Self> {
        let mut table = SentinelTable::new(generator.search_pattern_len())?;
        for window in windows {
            table.extend(generator.sentinels(keys, sentinels_per_key, *window)?);
        }
        debug!(
            "sentinel table holds {} patterns for {} windows",
            table.len(),
            windows.len()
        );
        Ok(table)
    }

    /// Index all remaining records of a stream.
    pub fn extend(&mut self, sentinels: Sentinels) {
        let window = sentinels.window();
        for record in sentinels {
            self.insert(&record, window);
        }
    }

    /// Index one record. On a search-pattern collision the entry already in
    /// the table is kept and `false` is returned.
    pub fn insert(&mut self, record: &SentinelRecord, window: Window) -> bool {
        let pattern: Box<[u8]> = record.sentinel.search_pattern_bytes(self.pattern_len).into();
        if let Some(existing) = self.patterns.get(&pattern) {
            warn!(
                "search pattern collision: key {} sequence {} shadows key {} sequence {}",
                existing.key_index, existing.sequence, record.key_index, record.sequence
            );
            return false;
        }
        self.patterns.insert(
            pattern,
            Entry {
                key_index: Arc::clone(&record.key_index),
                sequence: record.sequence,
                window,
                sentinel: record.sentinel,
            },
        );
        true
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern_len
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Look up an exact search pattern.
    pub fn lookup(&self, pattern: &[u8]) -> Option<SentinelMatch> {
        self.patterns.get(pattern).map(|e| to_match(e, 0))
    }

    /// Check whether `payload` starts with a known search pattern. Payloads
    /// shorter than a search pattern never match.
    pub fn matches_prefix(&self, payload: &[u8]) -> Option<SentinelMatch> {
        payload
            .get(..self.pattern_len)
            .and_then(|prefix| self.lookup(prefix))
    }

    /// Find the first occurrence of any search pattern in `payload`.
    pub fn find(&self, payload: &[u8]) -> Option<SentinelMatch> {
        payload
            .windows(self.pattern_len)
            .enumerate()
            .find_map(|(offset, candidate)| {
                self.patterns.get(candidate).map(|e| to_match(e, offset))
            })
    }
}

fn to_match(entry: &Entry, offset: usize) -> SentinelMatch {
    SentinelMatch {
        key_index: Arc::clone(&entry.key_index),
        sequence: entry.sequence,
        window: entry.window,
        sentinel: entry.sentinel,
        offset,
    }
}
