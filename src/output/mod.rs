//! The seam between the coordinator and the voice transport.
//!
//! The crate never talks to an audio device directly; the embedding driver
//! implements [`OutputConnector`] and [`OutputSession`], and reports the end
//! of each started stream through the [`Completion`] it was handed.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    api::{events::EndReason, tracks::StreamRef},
    common::{
        errors::OutputError,
        types::{ChannelId, GuildId},
    },
};

/// Completion notification for one `start` call.
#[derive(Debug)]
pub struct PlaybackEnded {
    /// Start generation this notification belongs to. Stale generations are
    /// ignored by the session, which makes queue advancement idempotent.
    pub seq: u64,
    pub reason: EndReason,
}

/// Handle the output driver uses to report that a started stream is done.
///
/// Consumed by value and not clonable, so each `start` call can complete at
/// most once — the exactly-once contract is structural.
pub struct Completion {
    tx: flume::Sender<PlaybackEnded>,
    seq: u64,
}

impl Completion {
    pub(crate) fn new(tx: flume::Sender<PlaybackEnded>, seq: u64) -> Self {
        Self { tx, seq }
    }

    /// Report the end of playback: natural end, explicit stop, or a device
    /// error mid-play.
    pub fn complete(self, reason: EndReason) {
        let _ = self.tx.send(PlaybackEnded {
            seq: self.seq,
            reason,
        });
    }
}

/// Live connection to one voice room, able to play one stream at a time.
#[async_trait]
pub trait OutputSession: Send + Sync {
    /// Begin transmitting `stream`. `done` must be completed exactly once
    /// over the lifetime of the started stream — on natural end, on stop,
    /// or on a device error after a successful start. If `start` itself
    /// fails, `done` may simply be dropped.
    async fn start(&self, stream: &StreamRef, done: Completion) -> Result<(), OutputError>;

    /// Stop the current stream; the pending completion fires with `Stopped`.
    async fn stop(&self) -> Result<(), OutputError>;

    async fn pause(&self) -> Result<(), OutputError>;

    async fn resume(&self) -> Result<(), OutputError>;

    async fn is_paused(&self) -> bool;

    /// Move the live connection to another room without interrupting
    /// playback.
    async fn move_to(&self, channel: ChannelId) -> Result<(), OutputError>;

    /// Tear down the connection. A pending completion fires with `Stopped`.
    async fn disconnect(&self) -> Result<(), OutputError>;
}

/// Factory for output sessions, implemented by the embedding voice driver.
#[async_trait]
pub trait OutputConnector: Send + Sync {
    async fn connect(
        &self,
        guild: &GuildId,
        channel: ChannelId,
    ) -> Result<Arc<dyn OutputSession>, OutputError>;
}
