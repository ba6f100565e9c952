pub mod events;
pub mod tracks;

pub use events::{DisconnectReason, EndReason, StatusEvent};
pub use tracks::{StreamRef, Track};
