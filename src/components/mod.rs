// Export components
pub mod assistant;
pub mod schedule;
pub mod sources;

// Re-export the schedule handle
pub use assistant::AssistantModel;
pub use schedule::ScheduleHandle;
pub use sources::{EventSource, MergedEventSource};
