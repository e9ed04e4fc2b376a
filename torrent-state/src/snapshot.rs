use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

const PRIME: i32 = 31;

// the bit pattern every NaN is hashed as
const CANONICAL_NAN_BITS: u64 = 0x7ff8_0000_0000_0000;

/// Live progress of a single torrent at one observation tick.
///
/// The engine builds one of these per tick and hands it to the display side,
/// which compares it against the last one it saw for the same torrent. Fields
/// are only set at construction.
#[derive(Debug, Clone)]
pub struct TorrentProgressSnapshot {
    torrent_id: Option<String>,
    seeds: i32,
    peers: i32,
    downloaded_pieces: i32,
    files_received_bytes: Vec<i64>,
    share_ratio: f64,
    active_time: i64,
    seeding_time: i64,
}

impl TorrentProgressSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        torrent_id: Option<String>,
        files_received_bytes: Vec<i64>,
        seeds: i32,
        peers: i32,
        downloaded_pieces: i32,
        share_ratio: f64,
        active_time: i64,
        seeding_time: i64,
    ) -> Self {
        TorrentProgressSnapshot {
            torrent_id,
            seeds,
            peers,
            downloaded_pieces,
            files_received_bytes,
            share_ratio,
            active_time,
            seeding_time,
        }
    }

    /// `None` only for snapshots decoded from a sender that had no identifier.
    pub fn torrent_id(&self) -> Option<&str> {
        self.torrent_id.as_deref()
    }

    pub fn seeds(&self) -> i32 {
        self.seeds
    }

    pub fn peers(&self) -> i32 {
        self.peers
    }

    pub fn downloaded_pieces(&self) -> i32 {
        self.downloaded_pieces
    }

    /// Bytes received per file, in the engine's file order.
    pub fn files_received_bytes(&self) -> &[i64] {
        &self.files_received_bytes
    }

    pub fn share_ratio(&self) -> f64 {
        self.share_ratio
    }

    /// Seconds the torrent has been active.
    pub fn active_time(&self) -> i64 {
        self.active_time
    }

    /// Seconds spent seeding.
    pub fn seeding_time(&self) -> i64 {
        self.seeding_time
    }

    /// Whether both snapshots describe the same torrent.
    ///
    /// An absent identifier on either side matches anything, which is what lets
    /// a zero-value placeholder compare equal on this dimension.
    pub fn is_same_torrent(&self, other: &Self) -> bool {
        match (&self.torrent_id, &other.torrent_id) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// Orders by identifier only, ascending. An absent identifier sorts as `""`.
    pub fn cmp_by_id(&self, other: &Self) -> Ordering {
        let a = self.torrent_id.as_deref().unwrap_or_default();
        let b = other.torrent_id.as_deref().unwrap_or_default();
        a.cmp(b)
    }

    /// Stable 32-bit digest built with the usual 31-prime combining scheme.
    ///
    /// Unlike the `Hash` impl this includes the identifier (an absent one
    /// contributes 0), so it only agrees with `==` when both identifiers are
    /// present or both absent.
    pub fn hash_code(&self) -> i32 {
        let mut result: i32 = 1;

        let id_hash = self.torrent_id.as_deref().map_or(0, string_hash);
        result = combine(result, id_hash);
        result = result.wrapping_add(long_array_hash(&self.files_received_bytes));
        result = combine(result, self.seeds);
        result = combine(result, self.peers);
        result = combine(result, self.downloaded_pieces);
        result = combine(result, fold(canonical_bits(self.share_ratio)));
        result = combine(result, fold(self.active_time as u64));
        result = combine(result, fold(self.seeding_time as u64));

        result
    }

    /// Exact size of this snapshot once encoded.
    pub fn encoded_len(&self) -> usize {
        // five length/int32 slots, three int64/double slots
        let fixed = 5 * 4 + 3 * 8;
        let id = self.torrent_id.as_ref().map_or(0, String::len);
        fixed + id + self.files_received_bytes.len() * 8
    }
}

impl Default for TorrentProgressSnapshot {
    fn default() -> Self {
        TorrentProgressSnapshot {
            torrent_id: Some(String::new()),
            seeds: 0,
            peers: 0,
            downloaded_pieces: 0,
            files_received_bytes: Vec::new(),
            share_ratio: 0.0,
            active_time: 0,
            seeding_time: 0,
        }
    }
}

impl PartialEq for TorrentProgressSnapshot {
    // share_ratio uses IEEE equality, so a NaN ratio only equals the very same value
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }

        self.is_same_torrent(other)
            && self.seeds == other.seeds
            && self.peers == other.peers
            && self.downloaded_pieces == other.downloaded_pieces
            && self.files_received_bytes == other.files_received_bytes
            && self.share_ratio == other.share_ratio
            && self.active_time == other.active_time
            && self.seeding_time == other.seeding_time
    }
}

// the identifier is left out: an absent one equals every identifier
impl Hash for TorrentProgressSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.seeds.hash(state);
        self.peers.hash(state);
        self.downloaded_pieces.hash(state);
        self.files_received_bytes.hash(state);
        canonical_bits(self.share_ratio).hash(state);
        self.active_time.hash(state);
        self.seeding_time.hash(state);
    }
}

impl fmt::Display for TorrentProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TorrentProgressSnapshot{{torrent_id=")?;
        match &self.torrent_id {
            Some(id) => write!(f, "'{}'", id)?,
            None => write!(f, "null")?,
        }
        write!(
            f,
            ", seeds={}, peers={}, downloaded_pieces={}, files_received_bytes={:?}, \
             active_time={}, seeding_time={}, share_ratio={:?}}}",
            self.seeds,
            self.peers,
            self.downloaded_pieces,
            self.files_received_bytes,
            self.active_time,
            self.seeding_time,
            self.share_ratio
        )
    }
}

fn combine(result: i32, value: i32) -> i32 {
    PRIME.wrapping_mul(result).wrapping_add(value)
}

// xor of the high and low 32-bit halves
fn fold(bits: u64) -> i32 {
    (bits ^ (bits >> 32)) as u32 as i32
}

// zero and NaN have several bit patterns that compare equal or are meant to
fn canonical_bits(value: f64) -> u64 {
    if value.is_nan() {
        CANONICAL_NAN_BITS
    } else if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

// polynomial hash over UTF-16 code units
fn string_hash(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |h, unit| combine(h, unit as i32))
}

fn long_array_hash(values: &[i64]) -> i32 {
    values
        .iter()
        .fold(1i32, |h, value| combine(h, fold(*value as u64)))
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use super::*;

    fn sample(id: Option<&str>) -> TorrentProgressSnapshot {
        TorrentProgressSnapshot::new(
            id.map(str::to_string),
            vec![1000, 2000],
            5,
            10,
            42,
            1.5,
            3600,
            1800,
        )
    }

    fn std_hash(snapshot: &TorrentProgressSnapshot) -> u64 {
        let mut hasher = DefaultHasher::new();
        snapshot.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn default_is_zero_value_with_empty_id() {
        let snapshot = TorrentProgressSnapshot::default();
        assert_eq!(snapshot.torrent_id(), Some(""));
        assert_eq!(snapshot.seeds(), 0);
        assert!(snapshot.files_received_bytes().is_empty());
        assert_eq!(snapshot.share_ratio(), 0.0);
    }

    #[test]
    fn string_hash_matches_polynomial_form() {
        // "abc" -> 97*31^2 + 98*31 + 99
        assert_eq!(string_hash("abc"), 96354);
        assert_eq!(string_hash(""), 0);
    }

    #[test]
    fn fold_xors_halves() {
        assert_eq!(fold(0x0000_0001_0000_0002), 3);
        assert_eq!(fold(u64::MAX), 0);
    }

    #[test]
    fn absent_id_matches_any_id_both_ways() {
        let absent = sample(None);
        let present = sample(Some("abc123"));
        assert_eq!(absent, present);
        assert_eq!(present, absent);
        assert_eq!(std_hash(&absent), std_hash(&present));
    }

    #[test]
    fn different_ids_are_unequal() {
        assert_ne!(sample(Some("a")), sample(Some("b")));
    }

    #[test]
    fn signed_zero_ratios_hash_alike() {
        let pos = TorrentProgressSnapshot::new(Some("t".into()), vec![], 0, 0, 0, 0.0, 0, 0);
        let neg = TorrentProgressSnapshot::new(Some("t".into()), vec![], 0, 0, 0, -0.0, 0, 0);
        assert_eq!(pos, neg);
        assert_eq!(pos.hash_code(), neg.hash_code());
        assert_eq!(std_hash(&pos), std_hash(&neg));
    }

    #[test]
    fn nan_ratio_is_only_equal_to_itself() {
        let a = TorrentProgressSnapshot::new(Some("t".into()), vec![], 0, 0, 0, f64::NAN, 0, 0);
        let b = a.clone();
        assert!(PartialEq::eq(&a, &a));
        assert_ne!(a, b);
        // hash collision without equality is allowed
        assert_eq!(a.hash_code(), b.hash_code());
    }

    #[test]
    fn cmp_by_id_treats_absent_as_empty() {
        let absent = sample(None);
        let empty = sample(Some(""));
        let named = sample(Some("a"));
        assert_eq!(absent.cmp_by_id(&empty), Ordering::Equal);
        assert_eq!(absent.cmp_by_id(&named), Ordering::Less);
        assert_eq!(named.cmp_by_id(&absent), Ordering::Greater);
    }

    #[test]
    fn display_shows_absent_id_as_null() {
        let text = sample(None).to_string();
        assert!(text.starts_with("TorrentProgressSnapshot{torrent_id=null, seeds=5"));
        assert!(text.contains("files_received_bytes=[1000, 2000]"));
        assert!(text.ends_with("share_ratio=1.5}"));
    }

    #[test]
    fn encoded_len_counts_id_bytes_and_files() {
        assert_eq!(sample(Some("t1")).encoded_len(), 44 + 2 + 16);
        assert_eq!(sample(None).encoded_len(), 44 + 16);
    }
}
