//! Search session coordination.

mod orchestrator;

pub use orchestrator::{SearchOrchestrator, SearchState};
