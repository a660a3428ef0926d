pub mod evaluator;
pub mod gate;
pub mod retention;

pub use evaluator::{evaluate_schedule, ResolutionPolicy, ScheduleDecision, ScheduleEvaluator};
pub use gate::{Alert, AlertGate, AlertOutcome};
pub use retention::LogRetentionService;
