// Export components
pub mod calendar;
pub mod discussions;
pub mod messages;
pub mod quiz;

pub use calendar::{CalendarService, MonthView};
pub use discussions::{DiscussionService, DiscussionThread};
pub use messages::MessageService;
pub use quiz::QuizSessionHandle;
