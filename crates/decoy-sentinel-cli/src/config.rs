use anyhow::{Result, bail};
use decoy_sentinel::{DEFAULT_SEARCH_PATTERN_LEN, Granularity, SentinelGenerator};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default number of records derived per parallel chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 16;

/// Complete configuration for gen-sentinels. Parsed to/from TOML. All
/// sections and fields are optional, command-line flags take precedence.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub sentinel: Option<SentinelConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SentinelConfig {
    /// "hour" (default) or "day".
    pub granularity: Option<Granularity>,
    /// Search pattern length in bytes.
    pub search_pattern_len: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    pub parallel: Option<bool>,
    pub chunk_size: Option<usize>,
    pub threads: Option<usize>,
    pub progress: Option<bool>,
}

/// How sentinels are written once the generator is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSettings {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
    pub progress: bool,
}

// a simple loader that reads the config from a file
impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// The generator described by the config, with `per_day` and
    /// `search_pattern_len` from the command line taking precedence.
    pub fn generator(
        &self,
        per_day: bool,
        search_pattern_len: Option<usize>,
    ) -> Result<SentinelGenerator> {
        let section = self.sentinel.clone().unwrap_or_default();
        let granularity = if per_day {
            Granularity::Day
        } else {
            section.granularity.unwrap_or_default()
        };
        let len = search_pattern_len
            .or(section.search_pattern_len)
            .unwrap_or(DEFAULT_SEARCH_PATTERN_LEN);
        Ok(SentinelGenerator::new(granularity, len)?)
    }

    /// Output settings, flags set on the command line win over the config.
    pub fn output(
        &self,
        parallel: bool,
        threads: Option<usize>,
        progress: bool,
    ) -> Result<OutputSettings> {
        let section = self.output.clone().unwrap_or_default();
        let chunk_size = section.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            bail!("chunk_size must be at least 1");
        }
        let threads = threads.or(section.threads);
        if threads == Some(0) {
            bail!("threads must be at least 1");
        }
        Ok(OutputSettings {
            parallel: parallel || section.parallel.unwrap_or(false) || threads.is_some(),
            chunk_size,
            threads,
            progress: progress || section.progress.unwrap_or(false),
        })
    }
}
