use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Malformed Input: {0}")]
    MalformedInput(String),

    #[error("Too Large: {field} has {len} entries, the wire format allows at most i32::MAX")]
    TooLarge { field: &'static str, len: usize },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, SnapshotError::MalformedInput(_))
    }
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;
