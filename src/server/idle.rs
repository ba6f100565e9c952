use std::sync::{Arc, Weak};

use tracing::{debug, info};

use crate::{config::PlaybackConfig, server::session::Session};

use super::coordinator::SessionMap;

/// Verdict of one watchdog poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchdogTick {
    /// Keep polling.
    Active,
    /// The loop is superseded or the session disconnected; stop polling.
    Disarm,
    /// Idle past the threshold while still connected; disconnect now.
    Expired,
}

/// Spawn the inactivity watchdog for a session.
///
/// At most one loop is effective per session: `Session::begin_watchdog`
/// hands out an epoch, and a loop whose epoch was superseded exits on its
/// next tick. The loop holds only weak references, so it never keeps a
/// session alive, and it terminates for good once it performs a disconnect —
/// a later join starts a fresh loop.
pub(crate) fn spawn(session: &Arc<Session>, sessions: Arc<SessionMap>, config: PlaybackConfig) {
    let Some(epoch) = session.begin_watchdog() else {
        return;
    };
    let guild_id = session.guild_id.clone();
    let weak: Weak<Session> = Arc::downgrade(session);

    tokio::spawn(async move {
        debug!(guild = %guild_id, epoch, "Inactivity watchdog started");
        let mut ticker = tokio::time::interval(config.idle_poll());

        loop {
            ticker.tick().await;
            let Some(session) = weak.upgrade() else {
                break;
            };
            match session.idle_check(epoch, config.idle_timeout()) {
                WatchdogTick::Active => continue,
                WatchdogTick::Disarm => break,
                WatchdogTick::Expired => {
                    // Re-checked under the session lock: a play request that
                    // landed since this tick cancels the expiry.
                    if session.expire_if_idle(config.idle_timeout()).await {
                        info!(guild = %guild_id, "Left voice channel after inactivity");
                        sessions.remove(&guild_id);
                        break;
                    }
                }
            }
        }
        debug!(guild = %guild_id, epoch, "Inactivity watchdog stopped");
    });
}
