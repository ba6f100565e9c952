use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque reference to a resolved, playable stream.
///
/// The coordinator never interprets the contents; it is produced by a
/// resolver and handed to the output driver as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamRef(String);

impl StreamRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StreamRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved track: what a resolver hands back and the queue holds.
/// Immutable once created; discarded after its playback completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Correlation id for logs and events.
    pub id: Uuid,
    pub title: String,
    pub stream: StreamRef,
}

impl Track {
    pub fn new(title: impl Into<String>, stream: StreamRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            stream,
        }
    }
}
