pub mod actor;
pub mod handle;
pub mod models;
pub mod scheduler;
pub mod session;

pub use actor::{SessionSnapshot, SubmitOutcome};
pub use handle::QuizSessionHandle;
pub use models::{format_remaining, Quiz, QuizAttemptResult, QuizSubmission};
pub use session::{QuizSession, SessionPhase};
