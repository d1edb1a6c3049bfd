//! Bulk generation of sentinels for every key in a key file.
//!
//! Generation is lazy: [`Sentinels`] derives each record when it is pulled,
//! so memory use is bounded by the number of keys rather than the number of
//! sentinels. Every position in the stream can be recomputed on its own,
//! which lets callers resume a stream or spread it over a rayon pool.

use std::{fmt, ops::Range, path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use log::debug;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::{
    error::{Error, Result},
    keyfile::KeyFile,
    sentinel::{DEFAULT_SEARCH_PATTERN_LEN, SENTINEL_LEN, Sentinel, SentinelKey},
    window::{Granularity, Window},
};

/// One generated sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelRecord {
    /// The index column of the key this sentinel was derived from.
    pub key_index: Arc<str>,
    /// Sequence number within the key, in `0..sentinels_per_key`.
    pub sequence: u64,
    /// Hex prefix matched against traffic.
    pub search_pattern: String,
    /// Hex remainder of the digest.
    pub label: String,
    /// The full digest.
    pub sentinel: Sentinel,
}

impl fmt::Display for SentinelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.sequence, self.search_pattern, self.label)
    }
}

/// Settings shared by every sentinel a generator derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelGenerator {
    granularity: Granularity,
    search_pattern_len: usize,
}

impl Default for SentinelGenerator {
    fn default() -> Self {
        SentinelGenerator {
            granularity: Granularity::Hour,
            search_pattern_len: DEFAULT_SEARCH_PATTERN_LEN,
        }
    }
}

impl SentinelGenerator {
    /// Create a generator. `search_pattern_len` is in bytes and must be in
    /// `1..=32`.
    pub fn new(granularity: Granularity, search_pattern_len: usize) -> Result<Self> {
        if !(1..=SENTINEL_LEN).contains(&search_pattern_len) {
            return Err(Error::InvalidArgument(format!(
                "search pattern length must be between 1 and {SENTINEL_LEN} bytes, got {search_pattern_len}"
            )));
        }
        Ok(SentinelGenerator {
            granularity,
            search_pattern_len,
        })
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn search_pattern_len(&self) -> usize {
        self.search_pattern_len
    }

    /// The window containing `utc`, or the current window if `None`.
    pub fn window(&self, utc: Option<DateTime<Utc>>) -> Window {
        Window::containing(utc.unwrap_or_else(Utc::now), self.granularity)
    }

    /// Sentinels for all keys in `keys` in the given window, ordered by key
    /// then sequence number.
    pub fn sentinels(
        &self,
        keys: &KeyFile,
        sentinels_per_key: u64,
        window: Window,
    ) -> Result<Sentinels> {
        if sentinels_per_key == 0 {
            return Err(Error::InvalidArgument(
                "number of sentinels per key must be at least 1".to_string(),
            ));
        }
        let per_key = usize::try_from(sentinels_per_key).map_err(|_| {
            Error::InvalidArgument(format!("too many sentinels per key: {sentinels_per_key}"))
        })?;
        let total = keys.len().checked_mul(per_key).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "{} keys with {per_key} sentinels each is too many",
                keys.len()
            ))
        })?;

        let keys = keys
            .entries()
            .iter()
            .map(|e| -> Result<(Arc<str>, SentinelKey)> {
                Ok((Arc::from(e.index.as_str()), SentinelKey::new(&e.key)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let label = window.label();
        debug!(
            "deriving {total} sentinels for {} keys in window '{label}'",
            keys.len()
        );

        Ok(Sentinels {
            keys,
            window,
            label,
            per_key,
            search_pattern_len: self.search_pattern_len,
            next: 0,
            end: total,
        })
    }

    /// Load `key_file` and generate `sentinels_per_key` sentinels for each of
    /// its keys, in the window containing `utc` (default: now, read once).
    /// The key file is fully parsed before anything is derived.
    pub fn generate_all<P: AsRef<Path>>(
        &self,
        key_file: P,
        sentinels_per_key: u64,
        utc: Option<DateTime<Utc>>,
    ) -> Result<Sentinels> {
        let window = self.window(utc);
        let keys = KeyFile::from_file(key_file)?;
        self.sentinels(&keys, sentinels_per_key, window)
    }
}

/// [`SentinelGenerator::generate_all`] with hourly windows and 8-byte search
/// patterns.
pub fn generate_all<P: AsRef<Path>>(
    key_file: P,
    sentinels_per_key: u64,
    utc: Option<DateTime<Utc>>,
) -> Result<Sentinels> {
    SentinelGenerator::default().generate_all(key_file, sentinels_per_key, utc)
}

/// A lazily derived, ordered stream of sentinel records.
pub struct Sentinels {
    keys: Vec<(Arc<str>, SentinelKey)>,
    window: Window,
    label: String,
    per_key: usize,
    search_pattern_len: usize,
    next: usize,
    end: usize,
}

impl Sentinels {
    pub fn window(&self) -> Window {
        self.window
    }

    pub fn window_label(&self) -> &str {
        &self.label
    }

    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn sentinels_per_key(&self) -> usize {
        self.per_key
    }

    pub fn search_pattern_len(&self) -> usize {
        self.search_pattern_len
    }

    /// Total number of records in the stream, consumed or not.
    pub fn total(&self) -> usize {
        self.end
    }

    /// Position of the next record to be yielded.
    pub fn position(&self) -> usize {
        self.next
    }

    /// Continue the stream at `position`. Positions past the end exhaust it.
    pub fn skip_to(&mut self, position: usize) {
        self.next = position.min(self.end);
    }

    /// Derive the record at `position` without touching the stream state.
    pub fn record_at(&self, position: usize) -> Option<SentinelRecord> {
        if position >= self.end {
            return None;
        }
        Some(self.derive(position))
    }

    /// All remaining records as an order-preserving parallel iterator.
    pub fn par_records(&self) -> impl IndexedParallelIterator<Item = SentinelRecord> + '_ {
        self.par_range(self.next..self.end)
    }

    /// Derive up to `max` of the next records in parallel and advance past
    /// them. Returns an empty vector once the stream is exhausted.
    pub fn next_chunk_par(&mut self, max: usize) -> Vec<SentinelRecord> {
        let end = self.next.saturating_add(max).min(self.end);
        let mut chunk = Vec::with_capacity(end - self.next);
        self.par_range(self.next..end).collect_into_vec(&mut chunk);
        self.next = end;
        chunk
    }

    fn par_range(
        &self,
        range: Range<usize>,
    ) -> impl IndexedParallelIterator<Item = SentinelRecord> + '_ {
        range.into_par_iter().map(move |position| self.derive(position))
    }

    fn derive(&self, position: usize) -> SentinelRecord {
        let (index, key) = &self.keys[position / self.per_key];
        let sequence = (position % self.per_key) as u64;
        let sentinel = key.derive(sequence, &self.label);
        SentinelRecord {
            key_index: Arc::clone(index),
            sequence,
            search_pattern: sentinel.search_pattern(self.search_pattern_len),
            label: sentinel.label(self.search_pattern_len),
            sentinel,
        }
    }
}

impl Iterator for Sentinels {
    type Item = SentinelRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.record_at(self.next)?;
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.skip_to(self.next.saturating_add(n));
        self.next()
    }
}

impl ExactSizeIterator for Sentinels {}

impl fmt::Debug for Sentinels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sentinels")
            .field("window", &self.label)
            .field("keys", &self.keys.len())
            .field("per_key", &self.per_key)
            .field("next", &self.next)
            .field("end", &self.end)
            .finish()
    }
}
