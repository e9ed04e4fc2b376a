pub mod channel;
pub mod config;
pub mod error;
pub mod monitor;

pub use torrent_state::snapshot::TorrentProgressSnapshot;
