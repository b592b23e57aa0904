//! Batch orchestration over a listing page

pub mod events;
pub mod orchestrator;

pub use events::BatchEvent;
pub use orchestrator::{BatchRequest, BatchRunner, ItemOutcome, ItemResult};
