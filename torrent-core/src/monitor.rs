use std::collections::{hash_map::Entry, HashMap};

use tokio::sync::RwLock;
use torrent_state::{decode_snapshot_with_limits, snapshot::TorrentProgressSnapshot, DecodeLimits};
use tracing::{debug, trace, warn};

use crate::{
    channel::ProgressReceiver,
    config::MonitorConfig,
    error::CoreResult,
};

/// What an observed snapshot means for the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// First snapshot seen for this torrent.
    New,
    Changed,
    /// Equal to the retained snapshot; nothing to redraw.
    Unchanged,
    /// No torrent id, so it cannot be matched to a row.
    Unkeyed,
}

impl Update {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, Update::New | Update::Changed)
    }
}

/// Keeps the last snapshot per torrent so redundant updates can be skipped.
pub struct ProgressMonitor {
    snapshots: RwLock<HashMap<String, TorrentProgressSnapshot>>,
    limits: DecodeLimits,
}

impl ProgressMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        ProgressMonitor {
            snapshots: RwLock::new(HashMap::new()),
            limits: config.decode_limits(),
        }
    }

    pub async fn observe(&self, snapshot: &TorrentProgressSnapshot) -> Update {
        let id = match snapshot.torrent_id() {
            Some(id) => id.to_string(),
            None => {
                debug!("progress snapshot without torrent id");
                return Update::Unkeyed;
            }
        };

        let mut snapshots = self.snapshots.write().await;
        match snapshots.entry(id) {
            Entry::Occupied(mut entry) => {
                if entry.get() == snapshot {
                    trace!(torrent_id = %entry.key(), "progress unchanged");
                    Update::Unchanged
                } else {
                    debug!(torrent_id = %entry.key(), "progress changed");
                    entry.insert(snapshot.clone());
                    Update::Changed
                }
            }
            Entry::Vacant(entry) => {
                debug!(torrent_id = %entry.key(), "new torrent progress");
                entry.insert(snapshot.clone());
                Update::New
            }
        }
    }

    /// Decodes one frame from any transport and observes it.
    pub async fn observe_frame(&self, frame: &[u8]) -> CoreResult<Update> {
        let snapshot = decode_snapshot_with_limits(frame, &self.limits).map_err(|err| {
            warn!(%err, len = frame.len(), "malformed progress frame");
            err
        })?;
        Ok(self.observe(&snapshot).await)
    }

    /// Observes every snapshot from `receiver` until all senders are dropped,
    /// calling `on_change` for the ones that need a redraw.
    ///
    /// Stops at the first malformed frame and returns its error.
    pub async fn pump<F>(&self, receiver: &mut ProgressReceiver, mut on_change: F) -> CoreResult<()>
    where
        F: FnMut(TorrentProgressSnapshot, Update),
    {
        while let Some(next) = receiver.recv().await {
            let snapshot = next?;
            let update = self.observe(&snapshot).await;
            if update.needs_redraw() {
                on_change(snapshot, update);
            }
        }
        Ok(())
    }

    pub async fn get(&self, torrent_id: &str) -> Option<TorrentProgressSnapshot> {
        self.snapshots.read().await.get(torrent_id).cloned()
    }

    /// Drops the retained snapshot, e.g. once a torrent is removed.
    pub async fn forget(&self, torrent_id: &str) -> Option<TorrentProgressSnapshot> {
        self.snapshots.write().await.remove(torrent_id)
    }

    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }

    /// Retained snapshots ordered by torrent id.
    pub async fn sorted(&self) -> Vec<TorrentProgressSnapshot> {
        let mut list: Vec<_> = self.snapshots.read().await.values().cloned().collect();
        list.sort_by(TorrentProgressSnapshot::cmp_by_id);
        list
    }
}
