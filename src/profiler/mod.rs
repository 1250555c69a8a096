//! Player behavior profiling
//!
//! Event ingestion and periodic sampling feed bounded histories; derived
//! scalars and pattern confidences are what the decision layer reads.

pub mod events;
pub mod history;
pub mod patterns;
pub mod snapshot;
pub mod tracker;

pub use events::{CombatStyle, ResourceKind, SubjectSample};
pub use history::BoundedHistory;
pub use patterns::{Pattern, PatternTable};
pub use snapshot::BehaviorSnapshot;
pub use tracker::BehaviorProfiler;
