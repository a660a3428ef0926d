pub mod alerts;
pub mod config;
pub mod db;
pub mod error;

// Re-export main components for easier use
pub use alerts::{
    Alert,
    AlertGate,
    AlertOutcome,
    LogRetentionService,
    ResolutionPolicy,
    ScheduleDecision,
    ScheduleEvaluator,
};
pub use db::repositories::{OffHoursLogRepository, SchedulesRepository};
pub use db::store::{FileStore, KeyValueStore, MemoryStore, PgStore};
pub use error::{Error, OperationResult, Result};
