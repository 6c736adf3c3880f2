use super::actor::{
    Navigation, QuizSessionActor, QuizSessionActorHandle, SessionSnapshot, SubmitOutcome,
};
use super::session::QuizSession;
use crate::api::LmsApi;
use crate::error::ClientResult;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::info;

/// Handle for interacting with an open quiz.
///
/// Dropping the last clone cancels the actor and its countdown.
#[derive(Clone)]
pub struct QuizSessionHandle {
    actor_handle: QuizSessionActorHandle,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    _cancel_guard: Arc<DropGuard>,
    _actor_task: Arc<JoinHandle<()>>,
}

impl QuizSessionHandle {
    /// Fetch the quiz definition and spawn its session actor
    pub async fn open(api: Arc<dyn LmsApi>, quiz_id: i64) -> ClientResult<Self> {
        let quiz = api.quiz(quiz_id).await?;
        let mut session = QuizSession::new(quiz_id);
        session.load(quiz)?;
        Ok(Self::spawn(session, api))
    }

    /// Spawn an actor for an already loaded session
    pub fn spawn(session: QuizSession, api: Arc<dyn LmsApi>) -> Self {
        let cancel = CancellationToken::new();
        let (mut actor, handle, snapshot_rx) = QuizSessionActor::new(session, api, cancel.clone());

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            snapshot_rx,
            _cancel_guard: Arc::new(cancel.drop_guard()),
            _actor_task: Arc::new(actor_task),
        }
    }

    pub async fn select_option(&self, question_id: i64, option_id: i64) -> ClientResult<()> {
        self.actor_handle.select_option(question_id, option_id).await
    }

    pub async fn answer_text(&self, question_id: i64, text: impl Into<String>) -> ClientResult<()> {
        self.actor_handle.answer_text(question_id, text.into()).await
    }

    pub async fn next(&self) -> ClientResult<usize> {
        self.actor_handle.navigate(Navigation::Next).await
    }

    pub async fn previous(&self) -> ClientResult<usize> {
        self.actor_handle.navigate(Navigation::Previous).await
    }

    pub async fn go_to(&self, index: usize) -> ClientResult<usize> {
        self.actor_handle.navigate(Navigation::Index(index)).await
    }

    /// Manual submit; pass `confirmed = true` after the user chose "submit anyway"
    pub async fn submit(&self, confirmed: bool) -> ClientResult<SubmitOutcome> {
        self.actor_handle.submit(confirmed).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that is notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stop the session; the countdown is cancelled with it
    pub async fn close(&self) -> ClientResult<()> {
        info!("Closing quiz {}", self.snapshot_rx.borrow().quiz_id);
        self.actor_handle.shutdown().await
    }
}
