pub mod coordinator;
pub mod idle;
pub mod session;

pub use coordinator::{Coordinator, PlayOutcome};
pub use session::Session;
