//! Incremental two-half refresh of the snapshot.

pub mod engine;
pub mod scheduler;
pub mod staleness;

pub use engine::{merge_snapshot, CyclePlan, CycleReport, Half, RefreshEngine};
pub use scheduler::{RefreshScheduler, SchedulerHandle, SchedulerState};
pub use staleness::StalenessPolicy;
