//! queuelink — voice-channel playback coordinator.
//!
//! Resolves play requests into playable tracks, serializes playback through
//! one output session per guild, and tears idle sessions down automatically.
//! The text-command frontend and the audio transport both live outside this
//! crate: the frontend drives [`server::Coordinator`] intents, the transport
//! implements the [`output`] traits.

pub mod api;
pub mod common;
pub mod config;
pub mod output;
pub mod player;
pub mod resolver;
pub mod server;

pub use config::Config;
pub use server::{Coordinator, PlayOutcome};
