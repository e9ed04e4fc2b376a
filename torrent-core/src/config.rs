use std::path::Path;

use serde::Deserialize;
use torrent_state::{DecodeLimits, DEFAULT_MAX_FILES, DEFAULT_MAX_ID_LEN};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Longest accepted torrent id, in bytes.
    #[serde(default = "default_max_id_len")]
    pub max_id_len: usize,
    /// Most per-file counters accepted in one snapshot.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Frames buffered between producer and consumer.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_max_id_len() -> usize {
    DEFAULT_MAX_ID_LEN
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            max_id_len: default_max_id_len(),
            max_files: default_max_files(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl MonitorConfig {
    pub fn from_json_str(content: &str) -> CoreResult<Self> {
        let config: MonitorConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.channel_capacity == 0 {
            return Err(CoreError::InvalidConfig(
                "channel_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn decode_limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_id_len: self.max_id_len,
            max_files: self.max_files,
        }
    }
}
