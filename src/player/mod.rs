pub mod context;
pub mod queue;

pub use context::PlayerContext;
pub use queue::{RemoveSelector, TrackQueue};
