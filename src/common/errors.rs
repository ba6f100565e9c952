use thiserror::Error;

/// Why a resolver could not turn an identifier into a track.
///
/// `UnsupportedFormat` is deliberately not folded into `NotFound`: the
/// identifier did resolve, there is just nothing playable behind it, and the
/// user-facing text differs.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("couldn't find anything for `{0}`")]
    NotFound(String),
    #[error("source request failed: {0}")]
    Network(String),
    #[error("`{0}` has no playable audio format")]
    UnsupportedFormat(String),
}

/// Failures raised by the output driver.
#[derive(Debug, Clone, Error)]
pub enum OutputError {
    #[error("voice connect failed: {0}")]
    Connect(String),
    #[error("playback device error: {0}")]
    Device(String),
}

/// Every way an intent can be rejected. The `Display` text is the
/// user-facing reason; none of these terminate the session.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("not connected to a voice channel")]
    NoActiveSession,
    #[error("nothing is playing")]
    NotPlaying,
    #[error("playback is not paused")]
    NotPaused,
    #[error("playback is already paused")]
    AlreadyPaused,
    #[error("you are not in my voice channel")]
    NotInRoom,
    #[error("queue positions start at 1")]
    InvalidPosition,
    #[error("no track at position {0}")]
    OutOfRange(usize),
    #[error("the queue is empty")]
    QueueEmpty,
    #[error("could not play track, skipping")]
    PlaybackFailed,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Output(#[from] OutputError),
}
