use crate::components::calendar::models::CalendarEventsResponse;
use crate::components::calendar::time::MonthRange;
use crate::components::discussions::models::{Discussion, DiscussionDetail, ReplyCreateRequest};
use crate::components::messages::models::{ConversationDetail, Inbox, MessageCreateRequest};
use crate::components::quiz::models::{Quiz, QuizAttemptResult, QuizSubmission};
use crate::error::ClientResult;
use async_trait::async_trait;

pub mod auth;
pub mod client;

pub use auth::{Role, TokenResponse};
pub use client::ApiClient;

/// REST endpoints the client consumes.
///
/// `ApiClient` talks to the real server; tests provide their own implementations.
#[async_trait]
pub trait LmsApi: Send + Sync {
    /// `POST /token` password grant
    async fn login(&self, username: &str, password: &str) -> ClientResult<TokenResponse>;

    /// `GET /calendar/events` for an inclusive date range, optionally one course
    async fn calendar_events(
        &self,
        range: &MonthRange,
        course_id: Option<i64>,
    ) -> ClientResult<CalendarEventsResponse>;

    /// `POST /calendar/sync`
    async fn sync_calendar(&self) -> ClientResult<()>;

    async fn quiz(&self, quiz_id: i64) -> ClientResult<Quiz>;

    async fn submit_quiz(&self, submission: &QuizSubmission) -> ClientResult<QuizAttemptResult>;

    async fn course_discussions(&self, course_id: i64) -> ClientResult<Vec<Discussion>>;

    async fn discussion(&self, discussion_id: i64) -> ClientResult<DiscussionDetail>;

    async fn post_reply(&self, discussion_id: i64, request: &ReplyCreateRequest) -> ClientResult<()>;

    async fn inbox(&self) -> ClientResult<Inbox>;

    async fn conversation(&self, conversation_id: i64) -> ClientResult<ConversationDetail>;

    async fn send_message(
        &self,
        conversation_id: i64,
        request: &MessageCreateRequest,
    ) -> ClientResult<()>;
}
