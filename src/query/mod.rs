//! Intent classification and context orchestration.

mod classifier;
mod executor;
mod types;

pub use classifier::IntentClassifier;
pub use executor::ContextOrchestrator;
pub use types::{ArchitectData, FetchedData, IntentAnalysis, Zone, ZoneData, ZoneMetadata};
