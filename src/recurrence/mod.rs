// Module declarations
pub(crate) mod recurrence_scheduler;
mod recurrence_scheduler_tests;

// Re-export the public interface
pub use recurrence_scheduler::{
    is_due, Clock, RecurrenceRunReport, RecurrenceScheduler, SystemClock,
};
