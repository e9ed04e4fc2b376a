use thiserror::Error;
use torrent_state::error::SnapshotError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Snapshot Error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Progress Channel Closed")]
    ChannelClosed,

    #[error("Invalid Config: {0}")]
    InvalidConfig(String),

    #[error("Config Parse Error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
