use async_trait::async_trait;

use crate::{api::tracks::Track, common::errors::ResolveError};

/// Trait that all track resolvers must implement.
///
/// Each source (direct HTTP streams, a search backend, ...) implements this
/// trait to turn a raw identifier into a playable track.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Unique identifier for this resolver (e.g., "http")
    fn name(&self) -> &str;

    /// Check if this resolver can handle the given identifier.
    fn can_handle(&self, identifier: &str) -> bool;

    /// Resolve the identifier into a playable track.
    ///
    /// May block for seconds on network round trips. The coordinator never
    /// holds session state across this call, so a slow resolution stalls
    /// nothing but its own play request.
    async fn resolve(&self, identifier: &str) -> Result<Track, ResolveError>;
}
