use tokio::sync::mpsc;
use torrent_state::{
    decode_snapshot_with_limits, encode_snapshot, snapshot::TorrentProgressSnapshot, DecodeLimits,
};
use tracing::warn;

use crate::{
    config::MonitorConfig,
    error::{CoreError, CoreResult},
};

/// Producer half. Snapshots are encoded before they enter the channel, so the
/// receiving side only ever sees bytes it has to decode itself.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<Vec<u8>>,
}

#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::Receiver<Vec<u8>>,
    limits: DecodeLimits,
}

pub fn progress_channel(config: &MonitorConfig) -> CoreResult<(ProgressSender, ProgressReceiver)> {
    config.validate()?;
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    Ok((
        ProgressSender { tx },
        ProgressReceiver {
            rx,
            limits: config.decode_limits(),
        },
    ))
}

impl ProgressSender {
    pub async fn send(&self, snapshot: &TorrentProgressSnapshot) -> CoreResult<()> {
        let frame = encode_snapshot(snapshot)?;
        self.send_frame(frame).await
    }

    /// Forwards an already encoded frame untouched.
    pub async fn send_frame(&self, frame: Vec<u8>) -> CoreResult<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| CoreError::ChannelClosed)
    }

    /// For engine threads outside the runtime. Panics if called from async code.
    pub fn blocking_send(&self, snapshot: &TorrentProgressSnapshot) -> CoreResult<()> {
        let frame = encode_snapshot(snapshot)?;
        self.tx
            .blocking_send(frame)
            .map_err(|_| CoreError::ChannelClosed)
    }
}

impl ProgressReceiver {
    /// Next decoded snapshot, or `None` once every sender is gone.
    ///
    /// A malformed frame comes back as an error; the channel stays usable and
    /// the caller decides whether to keep reading.
    pub async fn recv(&mut self) -> Option<CoreResult<TorrentProgressSnapshot>> {
        let frame = self.rx.recv().await?;
        let decoded = decode_snapshot_with_limits(&frame, &self.limits).map_err(|err| {
            warn!(%err, len = frame.len(), "malformed progress frame");
            CoreError::from(err)
        });
        Some(decoded)
    }
}
