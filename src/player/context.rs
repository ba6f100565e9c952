use std::sync::Arc;

use tokio::time::Instant;

use crate::{
    api::tracks::Track, common::types::ChannelId, output::OutputSession, player::queue::TrackQueue,
};

/// Mutable per-session playback state.
///
/// Always accessed under the session lock, which is held only for the
/// in-memory mutation itself — never across resolver or device calls.
pub struct PlayerContext {
    pub queue: TrackQueue,
    /// The track currently in flight, if any.
    pub current: Option<Track>,
    /// True strictly while the output device has an active playback.
    pub playing: bool,
    /// Live output handle; present exactly while a voice room is joined.
    pub output: Option<Arc<dyn OutputSession>>,
    pub current_channel: Option<ChannelId>,
    /// Set the instant the queue is empty with nothing playing; cleared the
    /// instant playback starts. Drives the inactivity watchdog.
    pub idle_since: Option<Instant>,
    /// Tombstone: whether a watchdog loop is running for this session.
    pub watchdog_active: bool,
    /// Distinguishes watchdog loop generations so a superseded loop exits.
    pub watchdog_epoch: u64,
    /// Start generation, bumped on every device start (and on start
    /// failure). Completions carrying an older generation are stale.
    pub playback_seq: u64,
}

impl PlayerContext {
    pub fn new() -> Self {
        Self {
            queue: TrackQueue::new(),
            current: None,
            playing: false,
            output: None,
            current_channel: None,
            // A freshly created session is idle until something plays.
            idle_since: Some(Instant::now()),
            watchdog_active: false,
            watchdog_epoch: 0,
            playback_seq: 0,
        }
    }
}

impl Default for PlayerContext {
    fn default() -> Self {
        Self::new()
    }
}
