use std::io::{Read, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use error::{SnapshotError, SnapshotResult};
use snapshot::TorrentProgressSnapshot;
use tracing::trace;

pub mod error;
pub mod snapshot;
mod wire;

pub const DEFAULT_MAX_ID_LEN: usize = 4096;
pub const DEFAULT_MAX_FILES: usize = 1 << 20;

/// Upper bounds on declared lengths, checked before anything is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Identifier length in bytes.
    pub max_id_len: usize,
    /// Number of entries in the per-file byte counters.
    pub max_files: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        DecodeLimits {
            max_id_len: DEFAULT_MAX_ID_LEN,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

pub fn encode_snapshot(snapshot: &TorrentProgressSnapshot) -> SnapshotResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(snapshot.encoded_len());
    write_snapshot(&mut buf, snapshot)?;
    Ok(buf)
}

/// Writes one snapshot in wire order.
///
/// Lengths are checked up front so an oversized field never leaves a partial
/// record in `dest`.
pub fn write_snapshot<W: Write>(
    dest: &mut W,
    snapshot: &TorrentProgressSnapshot,
) -> SnapshotResult<()> {
    wire::wire_len("torrent_id", snapshot.torrent_id().map_or(0, str::len))?;
    wire::wire_len(
        "files_received_bytes",
        snapshot.files_received_bytes().len(),
    )?;

    wire::write_string(dest, "torrent_id", snapshot.torrent_id())?;
    wire::write_long_array(
        dest,
        "files_received_bytes",
        snapshot.files_received_bytes(),
    )?;

    dest.write_i32::<LittleEndian>(snapshot.seeds())?;
    dest.write_i32::<LittleEndian>(snapshot.peers())?;
    dest.write_i32::<LittleEndian>(snapshot.downloaded_pieces())?;
    dest.write_f64::<LittleEndian>(snapshot.share_ratio())?;
    dest.write_i64::<LittleEndian>(snapshot.active_time())?;
    dest.write_i64::<LittleEndian>(snapshot.seeding_time())?;

    Ok(())
}

pub fn decode_snapshot(bytes: &[u8]) -> SnapshotResult<TorrentProgressSnapshot> {
    decode_snapshot_with_limits(bytes, &DecodeLimits::default())
}

/// Decodes a buffer holding exactly one snapshot; leftover bytes are an error.
pub fn decode_snapshot_with_limits(
    bytes: &[u8],
    limits: &DecodeLimits,
) -> SnapshotResult<TorrentProgressSnapshot> {
    let mut rest = bytes;
    let snapshot = read_snapshot(&mut rest, limits)?;
    if !rest.is_empty() {
        trace!(trailing = rest.len(), "trailing bytes after progress snapshot");
        return Err(SnapshotError::MalformedInput(format!(
            "{} trailing bytes after snapshot",
            rest.len()
        )));
    }
    Ok(snapshot)
}

/// Reads one snapshot from a stream and leaves whatever follows it unread.
pub fn read_snapshot<R: Read>(
    src: &mut R,
    limits: &DecodeLimits,
) -> SnapshotResult<TorrentProgressSnapshot> {
    let result = read_fields(src, limits);
    if let Err(err) = &result {
        trace!(%err, "failed to decode progress snapshot");
    }
    result
}

fn read_fields<R: Read>(
    src: &mut R,
    limits: &DecodeLimits,
) -> SnapshotResult<TorrentProgressSnapshot> {
    let torrent_id = wire::read_string(src, "torrent_id", limits.max_id_len)?;
    let files_received_bytes =
        wire::read_long_array(src, "files_received_bytes", limits.max_files)?;
    let seeds = wire::read_i32(src, "seeds")?;
    let peers = wire::read_i32(src, "peers")?;
    let downloaded_pieces = wire::read_i32(src, "downloaded_pieces")?;
    let share_ratio = wire::read_f64(src, "share_ratio")?;
    let active_time = wire::read_i64(src, "active_time")?;
    let seeding_time = wire::read_i64(src, "seeding_time")?;

    Ok(TorrentProgressSnapshot::new(
        torrent_id,
        files_received_bytes,
        seeds,
        peers,
        downloaded_pieces,
        share_ratio,
        active_time,
        seeding_time,
    ))
}
