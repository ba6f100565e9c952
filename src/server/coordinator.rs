use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::{
    api::{
        events::{DisconnectReason, StatusEvent},
        tracks::Track,
    },
    common::{
        errors::CoordinatorError,
        types::{ChannelId, GuildId},
    },
    config::{Config, PlaybackConfig},
    output::OutputConnector,
    player::RemoveSelector,
    resolver::ResolverManager,
    server::{idle, session::Session},
};

/// Registry of live sessions, keyed by guild.
pub(crate) type SessionMap = DashMap<GuildId, Arc<Session>>;

/// Acknowledgment for an accepted play intent.
#[derive(Debug, Clone)]
pub enum PlayOutcome {
    /// The track went straight to the output device.
    Started { track: Track },
    /// The track was appended at the given 1-based pending position.
    Queued { track: Track, position: usize },
}

/// The playback coordinator: one independent session per guild, created
/// lazily on the first play intent and torn down on inactivity.
///
/// All intent methods return a `Result` whose error `Display` is the
/// user-facing rejection reason; accepted intents describe the side effect
/// performed. Presentation-worthy happenings are additionally emitted on the
/// status channel handed out by [`Coordinator::new`].
pub struct Coordinator {
    sessions: Arc<SessionMap>,
    resolvers: ResolverManager,
    connector: Arc<dyn OutputConnector>,
    playback: PlaybackConfig,
    events: flume::Sender<StatusEvent>,
}

impl Coordinator {
    pub fn new(
        config: Config,
        resolvers: ResolverManager,
        connector: Arc<dyn OutputConnector>,
    ) -> (Self, flume::Receiver<StatusEvent>) {
        let (events, rx) = flume::unbounded();
        (
            Self {
                sessions: Arc::new(DashMap::new()),
                resolvers,
                connector,
                playback: config.playback,
                events,
            },
            rx,
        )
    }

    /// Resolve `query` and either start it immediately or append it to the
    /// guild's queue. Joins `channel` first if no voice room is held.
    ///
    /// Concurrent play intents resolve independently; queue position
    /// reflects the order resolutions complete, not the order requests were
    /// issued.
    pub async fn play(
        &self,
        guild: &GuildId,
        channel: ChannelId,
        query: &str,
    ) -> Result<PlayOutcome, CoordinatorError> {
        let session = self.session_or_create(guild);
        self.ensure_connected(&session, channel).await?;
        session.touch();

        // Resolution runs with no session state held; a skip or remove
        // arriving mid-resolve proceeds undisturbed.
        let track = self.resolvers.resolve(query).await?;

        let (position, drive) = session.enqueue(track.clone());
        if !drive {
            return Ok(PlayOutcome::Queued { track, position });
        }
        match session.play_next().await {
            Some(now_playing) if now_playing.id == track.id => {
                Ok(PlayOutcome::Started { track: now_playing })
            }
            // A head preserved from before a leave took the slot instead.
            Some(_) => Ok(PlayOutcome::Queued { track, position }),
            None => Err(CoordinatorError::PlaybackFailed),
        }
    }

    /// Stop the current track. The advance to the next entry is driven by
    /// the stop's completion notification, exactly like a natural end — so
    /// a skip can never double-advance the queue.
    pub async fn skip(
        &self,
        guild: &GuildId,
        caller_channel: ChannelId,
    ) -> Result<Track, CoordinatorError> {
        let session = self.session(guild)?;
        let output = session.output().ok_or(CoordinatorError::NoActiveSession)?;
        if session.current_channel() != Some(caller_channel) {
            return Err(CoordinatorError::NotInRoom);
        }
        let current = self.current_track(&session)?;
        info!(guild = %guild, title = %current.title, "Skipping");
        output.stop().await?;
        Ok(current)
    }

    /// Snapshot of pending titles in play order.
    pub fn queue_list(&self, guild: &GuildId) -> Result<Vec<String>, CoordinatorError> {
        Ok(self.session(guild)?.queue_titles())
    }

    /// Remove one pending entry by 1-based position or from the tail.
    pub fn remove(
        &self,
        guild: &GuildId,
        selector: RemoveSelector,
    ) -> Result<Track, CoordinatorError> {
        let session = self.session(guild)?;
        let removed = session.remove(selector)?;
        info!(guild = %guild, title = %removed.title, "Removed from queue");
        Ok(removed)
    }

    /// Drop every pending entry; the current track keeps playing.
    pub fn clear(&self, guild: &GuildId) -> Result<usize, CoordinatorError> {
        let session = self.session(guild)?;
        let removed = session.clear();
        info!(guild = %guild, removed, "Cleared queue");
        session.emit(StatusEvent::QueueCleared {
            guild_id: guild.clone(),
            removed,
        });
        Ok(removed)
    }

    pub async fn pause(&self, guild: &GuildId) -> Result<(), CoordinatorError> {
        let session = self.session(guild)?;
        let output = session.output().ok_or(CoordinatorError::NoActiveSession)?;
        if !session.is_playing() {
            return Err(CoordinatorError::NotPlaying);
        }
        if output.is_paused().await {
            return Err(CoordinatorError::AlreadyPaused);
        }
        output.pause().await?;
        Ok(())
    }

    pub async fn resume(&self, guild: &GuildId) -> Result<(), CoordinatorError> {
        let session = self.session(guild)?;
        let output = session.output().ok_or(CoordinatorError::NoActiveSession)?;
        if !output.is_paused().await {
            return Err(CoordinatorError::NotPaused);
        }
        output.resume().await?;
        Ok(())
    }

    /// Disconnect from the voice room. Pending entries are kept: a later
    /// play reconnects and resumes from the preserved queue head.
    pub async fn leave(&self, guild: &GuildId) -> Result<(), CoordinatorError> {
        let session = self.session(guild)?;
        if !session.is_connected() {
            return Err(CoordinatorError::NoActiveSession);
        }
        session.shutdown(DisconnectReason::Requested).await;
        Ok(())
    }

    /// Move the output session to another room without touching playback.
    pub async fn move_to(
        &self,
        guild: &GuildId,
        channel: ChannelId,
    ) -> Result<(), CoordinatorError> {
        let session = self.session(guild)?;
        let output = session.output().ok_or(CoordinatorError::NoActiveSession)?;
        output.move_to(channel).await?;
        session.set_channel(channel);
        info!(guild = %guild, %channel, "Moved voice session");
        Ok(())
    }

    pub fn has_session(&self, guild: &GuildId) -> bool {
        self.sessions.contains_key(guild)
    }

    fn session(&self, guild: &GuildId) -> Result<Arc<Session>, CoordinatorError> {
        self.sessions
            .get(guild)
            .map(|entry| entry.value().clone())
            .ok_or(CoordinatorError::NoActiveSession)
    }

    fn session_or_create(&self, guild: &GuildId) -> Arc<Session> {
        self.sessions
            .entry(guild.clone())
            .or_insert_with(|| Session::spawn(guild.clone(), self.events.clone()))
            .clone()
    }

    fn current_track(&self, session: &Arc<Session>) -> Result<Track, CoordinatorError> {
        if !session.is_playing() {
            return Err(CoordinatorError::NotPlaying);
        }
        session
            .current()
            .ok_or(CoordinatorError::NotPlaying)
    }

    async fn ensure_connected(
        &self,
        session: &Arc<Session>,
        channel: ChannelId,
    ) -> Result<(), CoordinatorError> {
        let _gate = session.connect_gate.lock().await;
        if session.is_connected() {
            return Ok(());
        }
        info!(guild = %session.guild_id, %channel, "Joining voice channel");
        let output = self.connector.connect(&session.guild_id, channel).await?;
        session.attach_output(output, channel);
        idle::spawn(session, self.sessions.clone(), self.playback.clone());
        // Re-register in case the idle reaper removed the entry mid-connect.
        self.sessions
            .entry(session.guild_id.clone())
            .or_insert_with(|| session.clone());
        Ok(())
    }
}
