pub mod competition_events;
pub mod competition_service;
pub mod scheduler;
pub mod validation;

pub use competition_events::CompetitionEvents;
pub use competition_service::{CompetitionError, CompetitionService};
pub use scheduler::SchedulerService;
pub use validation::CompetitionValidator;
