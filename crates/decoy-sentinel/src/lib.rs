//! Decoy Sentinel derives the keyed, time-windowed tokens that tag covert
//! decoy-routing traffic.
//!
//! A client and a decoy router share a key. Without talking to each other,
//! both derive the same short list of sentinels for the current time window:
//! the client embeds one in an otherwise ordinary connection and the router,
//! scanning passing traffic for the search patterns of all registered keys,
//! recognizes the connection as covert.
//!
//! A sentinel is `HMAC-SHA256(key, "<window label> <sequence number>")`, where
//! the window label is the UTC time truncated to the hour (or the day, see
//! [`Granularity`]). Sentinels are pure functions of their inputs, so
//! independently clocked hosts agree as long as they are in the same window.
//!
//! ## Example usage
//! ```
//! use chrono::{TimeZone, Utc};
//! use decoy_sentinel::{Granularity, KeyFile, SentinelGenerator, SentinelTable};
//!
//! // Keys are normally provisioned as a file of `index key` lines, see
//! // `SentinelGenerator::generate_all`.
//! let keys: KeyFile = "0 testkey1\n1 testkey2\n".parse().unwrap();
//!
//! // Read the clock once and reuse the window for the whole batch.
//! let generator = SentinelGenerator::new(Granularity::Hour, 8).unwrap();
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap();
//! let window = generator.window(Some(now));
//! assert_eq!(window.label(), "2024-01-01 10");
//!
//! // Client side: the records come out grouped by key, then sequence number.
//! let records: Vec<_> = generator.sentinels(&keys, 2, window).unwrap().collect();
//! assert_eq!(records.len(), 4);
//! assert_eq!(records[0].search_pattern, "2cd357a485023f3b");
//!
//! // Router side: index the patterns of the surrounding windows and scan.
//! let table =
//!     SentinelTable::for_windows(&generator, &keys, 2, &window.skew_tolerant()).unwrap();
//! let mut payload = b"hello ".to_vec();
//! payload.extend_from_slice(records[3].sentinel.search_pattern_bytes(8));
//! let hit = table.find(&payload).unwrap();
//! assert_eq!(&*hit.key_index, "1");
//! assert_eq!(hit.sequence, 1);
//! assert_eq!(hit.offset, 6);
//! ```
pub mod error;
pub mod generator;
pub mod keyfile;
pub mod matcher;
pub mod sentinel;
pub mod window;

pub use crate::error::{Error, LineError, Result};
pub use crate::generator::{SentinelGenerator, SentinelRecord, Sentinels, generate_all};
pub use crate::keyfile::{KeyEntry, KeyFile};
pub use crate::matcher::{SentinelMatch, SentinelTable};
pub use crate::sentinel::{
    DEFAULT_SEARCH_PATTERN_LEN, SENTINEL_LEN, Sentinel, SentinelKey, derive_sentinel,
};
pub use crate::window::{Granularity, Window, window_label};
