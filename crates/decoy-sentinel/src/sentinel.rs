//! Keyed derivation of single sentinels.
//!
//! A sentinel is `HMAC-SHA256(key, "<window label> <sequence number>")`. The
//! first bytes of the digest are the search pattern a decoy router looks for
//! in passing traffic; the rest is the label used to correlate a match back to
//! its metadata.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Length of a sentinel digest in bytes.
pub const SENTINEL_LEN: usize = 32;

/// Default length of the search pattern in bytes (16 hex characters).
pub const DEFAULT_SEARCH_PATTERN_LEN: usize = 8;

/// A key prepared for sentinel derivation. The HMAC key schedule is computed
/// once and cloned for each sentinel.
#[derive(Clone)]
pub struct SentinelKey {
    mac: HmacSha256,
}

impl SentinelKey {
    /// Prepare `key`, which is used verbatim as the HMAC key.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::InvalidKey);
        }
        let mac = <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| Error::InvalidKey)?;
        Ok(SentinelKey { mac })
    }

    /// Derive the sentinel for `sequence` in the window named by
    /// `window_label`.
    pub fn derive(&self, sequence: u64, window_label: &str) -> Sentinel {
        let mut mac = self.mac.clone();
        mac.update(window_label.as_bytes());
        mac.update(b" ");
        mac.update(sequence.to_string().as_bytes());
        let mut digest = [0u8; SENTINEL_LEN];
        digest.copy_from_slice(&mac.finalize().into_bytes());
        Sentinel(digest)
    }
}

impl fmt::Debug for SentinelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SentinelKey(..)")
    }
}

/// Derive a single sentinel from raw key material. Prefer [`SentinelKey`]
/// when deriving many sentinels for the same key.
pub fn derive_sentinel(key: &[u8], sequence: u64, window_label: &str) -> Result<Sentinel> {
    Ok(SentinelKey::new(key)?.derive(sequence, window_label))
}

/// A 256-bit sentinel digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sentinel([u8; SENTINEL_LEN]);

impl Sentinel {
    pub fn from_bytes(bytes: [u8; SENTINEL_LEN]) -> Self {
        Sentinel(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SENTINEL_LEN] {
        &self.0
    }

    /// The full digest as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The first `len` bytes, as matched on the wire. `len` is clamped to the
    /// digest length.
    pub fn search_pattern_bytes(&self, len: usize) -> &[u8] {
        &self.0[..len.min(SENTINEL_LEN)]
    }

    /// The search pattern as `2 * len` hex characters.
    pub fn search_pattern(&self, len: usize) -> String {
        hex::encode(self.search_pattern_bytes(len))
    }

    /// Everything after the search pattern, in hex.
    pub fn label(&self, search_pattern_len: usize) -> String {
        hex::encode(&self.0[search_pattern_len.min(SENTINEL_LEN)..])
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
