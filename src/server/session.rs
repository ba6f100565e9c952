use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    api::{
        events::{DisconnectReason, StatusEvent},
        tracks::Track,
    },
    common::types::{ChannelId, GuildId, SessionId},
    output::{Completion, OutputSession, PlaybackEnded},
    player::{PlayerContext, RemoveSelector},
    server::idle::WatchdogTick,
};

/// One per-guild playback session: the queue, the playing/idle flags, and
/// the output handle, all behind a single lock.
///
/// Completion notifications are funneled through one channel and consumed by
/// one loop task, so queue advancement for a session is strictly serialized
/// even though intents arrive from arbitrary tasks.
pub struct Session {
    pub guild_id: GuildId,
    pub session_id: SessionId,
    state: Mutex<PlayerContext>,
    /// Serializes connect attempts; held across the connector call, which the
    /// state lock never is.
    pub(crate) connect_gate: tokio::sync::Mutex<()>,
    events: flume::Sender<StatusEvent>,
    completions: flume::Sender<PlaybackEnded>,
}

impl Session {
    pub(crate) fn spawn(guild_id: GuildId, events: flume::Sender<StatusEvent>) -> Arc<Self> {
        let (tx, rx) = flume::unbounded();
        let session = Arc::new(Self {
            guild_id,
            session_id: SessionId::generate(),
            state: Mutex::new(PlayerContext::new()),
            connect_gate: tokio::sync::Mutex::new(()),
            events,
            completions: tx,
        });
        info!(
            guild = %session.guild_id,
            session = %session.session_id,
            "Created playback session"
        );

        // The loop holds only a weak reference, so a session removed from
        // the registry is dropped and the loop winds down with it.
        let weak = Arc::downgrade(&session);
        tokio::spawn(completion_loop(weak, rx));
        session
    }

    pub(crate) fn emit(&self, event: StatusEvent) {
        if let Ok(json) = serde_json::to_string(&event) {
            debug!(guild = %self.guild_id, "Event: {}", json);
        }
        let _ = self.events.send(event);
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().output.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn current_channel(&self) -> Option<ChannelId> {
        self.state.lock().current_channel
    }

    pub fn current(&self) -> Option<Track> {
        self.state.lock().current.clone()
    }

    pub fn queue_titles(&self) -> Vec<String> {
        self.state.lock().queue.titles()
    }

    pub(crate) fn output(&self) -> Option<Arc<dyn OutputSession>> {
        self.state.lock().output.clone()
    }

    pub(crate) fn attach_output(&self, output: Arc<dyn OutputSession>, channel: ChannelId) {
        let mut st = self.state.lock();
        st.output = Some(output);
        st.current_channel = Some(channel);
        if !st.playing && st.idle_since.is_none() {
            st.idle_since = Some(Instant::now());
        }
    }

    /// Push the idle deadline on user activity while nothing is playing.
    pub(crate) fn touch(&self) {
        let mut st = self.state.lock();
        if !st.playing && st.idle_since.is_some() {
            st.idle_since = Some(Instant::now());
        }
    }

    pub(crate) fn set_channel(&self, channel: ChannelId) {
        self.state.lock().current_channel = Some(channel);
    }

    /// Append a resolved track. Returns its 1-based pending position and
    /// whether the caller should drive the queue (nothing was playing).
    pub(crate) fn enqueue(&self, track: Track) -> (usize, bool) {
        let (position, will_start) = {
            let mut st = self.state.lock();
            let position = st.queue.enqueue(track.clone());
            (position, !st.playing && st.output.is_some())
        };
        if !(will_start && position == 1) {
            info!(
                guild = %self.guild_id,
                title = %track.title,
                position,
                "Queued"
            );
            self.emit(StatusEvent::TrackQueued {
                guild_id: self.guild_id.clone(),
                track,
                position,
            });
        }
        (position, will_start)
    }

    pub(crate) fn remove(&self, selector: RemoveSelector) -> Result<Track, crate::common::errors::CoordinatorError> {
        self.state.lock().queue.remove(selector)
    }

    pub(crate) fn clear(&self) -> usize {
        self.state.lock().queue.clear()
    }

    /// Start the queue head if nothing is playing, skipping past entries the
    /// device rejects. Returns the track now playing, or `None` once the
    /// session went (or stayed) idle.
    pub(crate) async fn play_next(&self) -> Option<Track> {
        loop {
            let (track, seq, output) = {
                let mut st = self.state.lock();
                if st.playing {
                    // Someone else drove the queue between our lock windows.
                    return st.current.clone();
                }
                let output = st.output.clone()?;
                match st.queue.pop_front() {
                    Some(track) => {
                        st.playback_seq += 1;
                        st.playing = true;
                        st.idle_since = None;
                        st.current = Some(track.clone());
                        (track, st.playback_seq, output)
                    }
                    None => {
                        st.idle_since = Some(Instant::now());
                        return None;
                    }
                }
            };

            info!(guild = %self.guild_id, title = %track.title, "Now playing");
            self.emit(StatusEvent::TrackStart {
                guild_id: self.guild_id.clone(),
                track: track.clone(),
            });

            let done = Completion::new(self.completions.clone(), seq);
            match output.start(&track.stream, done).await {
                Ok(()) => return Some(track),
                Err(e) => {
                    warn!(
                        guild = %self.guild_id,
                        title = %track.title,
                        "Could not play track, skipping: {}",
                        e
                    );
                    self.emit(StatusEvent::TrackException {
                        guild_id: self.guild_id.clone(),
                        track,
                        message: e.to_string(),
                    });
                    let mut st = self.state.lock();
                    if st.playback_seq == seq {
                        // Bump the generation so a completion the driver may
                        // still fire for the failed start is dropped as stale.
                        st.playback_seq += 1;
                        st.playing = false;
                        st.current = None;
                    }
                }
            }
        }
    }

    /// The sole driver of queue advancement: one notification per started
    /// stream, processed in arrival order by the completion loop.
    pub(crate) async fn handle_playback_ended(&self, ended: PlaybackEnded) {
        let finished = {
            let mut st = self.state.lock();
            if ended.seq != st.playback_seq {
                debug!(
                    guild = %self.guild_id,
                    seq = ended.seq,
                    current = st.playback_seq,
                    "Ignoring stale completion"
                );
                return;
            }
            st.playing = false;
            let finished = st.current.take();
            // Queue exhaustion and the playing flag flip in the same
            // critical section, so no reader sees them disagree.
            if st.queue.is_empty() {
                st.idle_since = Some(Instant::now());
            }
            finished
        };

        if let Some(track) = finished {
            info!(
                guild = %self.guild_id,
                title = %track.title,
                reason = ?ended.reason,
                "Track ended"
            );
            self.emit(StatusEvent::TrackEnd {
                guild_id: self.guild_id.clone(),
                track,
                reason: ended.reason,
            });
        }

        self.play_next().await;
    }

    /// Mark a watchdog loop as running. Returns the loop's epoch, or `None`
    /// if one is already active for this session.
    pub(crate) fn begin_watchdog(&self) -> Option<u64> {
        let mut st = self.state.lock();
        if st.watchdog_active {
            return None;
        }
        st.watchdog_active = true;
        st.watchdog_epoch += 1;
        Some(st.watchdog_epoch)
    }

    /// One watchdog tick: re-reads `idle_since` instead of caching a
    /// deadline, because activity can resume and pause many times.
    pub(crate) fn idle_check(&self, epoch: u64, timeout: Duration) -> WatchdogTick {
        let mut st = self.state.lock();
        if st.watchdog_epoch != epoch {
            return WatchdogTick::Disarm;
        }
        if st.output.is_none() {
            st.watchdog_active = false;
            return WatchdogTick::Disarm;
        }
        match st.idle_since {
            Some(since) if since.elapsed() >= timeout => WatchdogTick::Expired,
            _ => WatchdogTick::Active,
        }
    }

    /// Tear down if still idle past `timeout`; re-checked under the lock so
    /// a play request that slipped in just before cancels the expiry.
    pub(crate) async fn expire_if_idle(&self, timeout: Duration) -> bool {
        let output = {
            let mut st = self.state.lock();
            let expired = st
                .idle_since
                .map(|since| since.elapsed() >= timeout)
                .unwrap_or(false);
            if !expired || st.output.is_none() {
                return false;
            }
            Self::teardown(&mut st)
        };
        self.finish_disconnect(output, DisconnectReason::Inactivity)
            .await;
        true
    }

    /// Unconditional disconnect for explicit leave. The pending queue is
    /// intentionally preserved: leave is not clear.
    pub(crate) async fn shutdown(&self, reason: DisconnectReason) {
        let output = {
            let mut st = self.state.lock();
            Self::teardown(&mut st)
        };
        self.finish_disconnect(output, reason).await;
    }

    fn teardown(st: &mut PlayerContext) -> Option<Arc<dyn OutputSession>> {
        // Invalidate any in-flight completion before dropping the handle.
        st.playback_seq += 1;
        st.playing = false;
        st.current = None;
        st.current_channel = None;
        st.idle_since = None;
        st.watchdog_active = false;
        st.output.take()
    }

    async fn finish_disconnect(
        &self,
        output: Option<Arc<dyn OutputSession>>,
        reason: DisconnectReason,
    ) {
        if let Some(output) = output {
            info!(guild = %self.guild_id, ?reason, "Disconnecting voice session");
            if let Err(e) = output.disconnect().await {
                warn!(guild = %self.guild_id, "Voice disconnect failed: {}", e);
            }
            self.emit(StatusEvent::Disconnected {
                guild_id: self.guild_id.clone(),
                reason,
            });
        }
    }
}

async fn completion_loop(session: Weak<Session>, rx: flume::Receiver<PlaybackEnded>) {
    while let Ok(ended) = rx.recv_async().await {
        let Some(session) = session.upgrade() else {
            break;
        };
        session.handle_playback_ended(ended).await;
    }
}

#[cfg(test)]
impl Session {
    pub(crate) fn inject_completion(&self, seq: u64, reason: crate::api::events::EndReason) {
        let _ = self.completions.send(PlaybackEnded { seq, reason });
    }

    pub(crate) fn current_seq(&self) -> u64 {
        self.state.lock().playback_seq
    }

    pub(crate) fn is_idle(&self) -> bool {
        let st = self.state.lock();
        !st.playing && st.idle_since.is_some()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.state.lock().queue.len()
    }
}
