use serde::Serialize;

use crate::{api::tracks::Track, common::types::GuildId};

/// Events emitted by the coordinator for the presentation layer.
///
/// How these are rendered (embeds, plain text, ...) is outside the core.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StatusEvent {
    #[serde(rename = "TrackStartEvent")]
    #[serde(rename_all = "camelCase")]
    TrackStart { guild_id: GuildId, track: Track },

    #[serde(rename = "TrackQueuedEvent")]
    #[serde(rename_all = "camelCase")]
    TrackQueued {
        guild_id: GuildId,
        track: Track,
        /// 1-based position among the pending entries.
        position: usize,
    },

    #[serde(rename = "TrackEndEvent")]
    #[serde(rename_all = "camelCase")]
    TrackEnd {
        guild_id: GuildId,
        track: Track,
        reason: EndReason,
    },

    #[serde(rename = "TrackExceptionEvent")]
    #[serde(rename_all = "camelCase")]
    TrackException {
        guild_id: GuildId,
        track: Track,
        message: String,
    },

    #[serde(rename = "QueueClearedEvent")]
    #[serde(rename_all = "camelCase")]
    QueueCleared { guild_id: GuildId, removed: usize },

    #[serde(rename = "DisconnectedEvent")]
    #[serde(rename_all = "camelCase")]
    Disconnected {
        guild_id: GuildId,
        reason: DisconnectReason,
    },
}

/// Why a started track stopped producing audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    /// The stream ran to its natural end.
    Finished,
    /// Playback was stopped explicitly (skip, leave, disconnect).
    Stopped,
    /// The device gave up on the stream mid-play.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DisconnectReason {
    /// An explicit leave intent.
    Requested,
    /// The inactivity watchdog fired.
    Inactivity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tracks::StreamRef;

    #[test]
    fn events_serialize_with_tagged_type() {
        let track = Track::new("Test Song", StreamRef::new("https://cdn.example/a.opus"));
        let event = StatusEvent::TrackStart {
            guild_id: GuildId("g1".to_string()),
            track,
        };

        let value = serde_json::to_value(&event).expect("serialize should succeed");
        assert_eq!(value["type"], "TrackStartEvent");
        assert_eq!(value["guildId"], "g1");
        assert_eq!(value["track"]["title"], "Test Song");
    }

    #[test]
    fn end_reason_serializes_camel_case() {
        let event = StatusEvent::Disconnected {
            guild_id: GuildId("g1".to_string()),
            reason: DisconnectReason::Inactivity,
        };
        let value = serde_json::to_value(&event).expect("serialize should succeed");
        assert_eq!(value["reason"], "inactivity");
    }
}
