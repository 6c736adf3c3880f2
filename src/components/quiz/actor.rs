use super::models::{QuizAttemptResult, QuizSubmission};
use super::scheduler::{start_countdown, TICK_PERIOD};
use super::session::{QuizSession, SessionPhase, SubmitDecision, TickOutcome};
use crate::api::LmsApi;
use crate::error::{other_error, ClientResult};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Outcome of a manual submit request
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was sent; this many questions are unanswered and need a "submit anyway"
    NeedsConfirmation { unanswered: usize },
    Submitted(QuizAttemptResult),
}

/// Question navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    Index(usize),
}

/// Read-only view of a session for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub quiz_id: i64,
    pub phase: SessionPhase,
    pub current_index: usize,
    pub question_count: usize,
    pub remaining_seconds: Option<u32>,
    pub unanswered: usize,
    pub last_error: Option<String>,
    pub result: Option<QuizAttemptResult>,
}

impl SessionSnapshot {
    fn of(session: &QuizSession) -> Self {
        Self {
            quiz_id: session.quiz_id(),
            phase: session.phase(),
            current_index: session.current_index(),
            question_count: session.question_count(),
            remaining_seconds: session.remaining_seconds(),
            unanswered: session.unanswered().len(),
            last_error: session.last_error().map(str::to_string),
            result: session.result().cloned(),
        }
    }
}

/// Commands that can be sent to the quiz session actor
pub enum QuizCommand {
    SelectOption {
        question_id: i64,
        option_id: i64,
        respond_to: mpsc::Sender<ClientResult<()>>,
    },
    AnswerText {
        question_id: i64,
        text: String,
        respond_to: mpsc::Sender<ClientResult<()>>,
    },
    Navigate(Navigation, mpsc::Sender<usize>),
    Submit {
        confirmed: bool,
        respond_to: mpsc::Sender<ClientResult<SubmitOutcome>>,
    },
    Shutdown,
}

/// Handle for communicating with the quiz session actor
#[derive(Clone)]
pub struct QuizSessionActorHandle {
    command_tx: mpsc::Sender<QuizCommand>,
}

impl QuizSessionActorHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<T>) -> QuizCommand,
    ) -> ClientResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|e| other_error(&format!("Quiz session mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| other_error("Quiz session closed"))
    }

    pub async fn select_option(&self, question_id: i64, option_id: i64) -> ClientResult<()> {
        self.request(|respond_to| QuizCommand::SelectOption {
            question_id,
            option_id,
            respond_to,
        })
        .await?
    }

    pub async fn answer_text(&self, question_id: i64, text: String) -> ClientResult<()> {
        self.request(|respond_to| QuizCommand::AnswerText {
            question_id,
            text,
            respond_to,
        })
        .await?
    }

    pub async fn navigate(&self, navigation: Navigation) -> ClientResult<usize> {
        self.request(|respond_to| QuizCommand::Navigate(navigation, respond_to))
            .await
    }

    pub async fn submit(&self, confirmed: bool) -> ClientResult<SubmitOutcome> {
        self.request(|respond_to| QuizCommand::Submit {
            confirmed,
            respond_to,
        })
        .await?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> ClientResult<()> {
        let _ = self.command_tx.send(QuizCommand::Shutdown).await;
        Ok(())
    }
}

/// Owns one quiz session: applies commands, counts down, and runs submissions.
///
/// Submissions run as separate tasks so the countdown keeps ticking and a second submit
/// is rejected while one is outstanding.
pub struct QuizSessionActor {
    session: QuizSession,
    api: Arc<dyn LmsApi>,
    command_rx: mpsc::Receiver<QuizCommand>,
    tick_rx: Option<mpsc::Receiver<()>>,
    completion_tx: mpsc::Sender<ClientResult<QuizAttemptResult>>,
    completion_rx: mpsc::Receiver<ClientResult<QuizAttemptResult>>,
    pending_reply: Option<mpsc::Sender<ClientResult<SubmitOutcome>>>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    cancel: CancellationToken,
    countdown: CancellationToken,
}

impl QuizSessionActor {
    /// Create a new actor for a loaded session and return its handle and snapshot feed
    pub fn new(
        session: QuizSession,
        api: Arc<dyn LmsApi>,
        cancel: CancellationToken,
    ) -> (Self, QuizSessionActorHandle, watch::Receiver<SessionSnapshot>) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (completion_tx, completion_rx) = mpsc::channel(1);
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::of(&session));

        let countdown = cancel.child_token();
        let tick_rx = session
            .is_timed()
            .then(|| start_countdown(countdown.clone(), TICK_PERIOD));

        let actor = Self {
            session,
            api,
            command_rx,
            tick_rx,
            completion_tx,
            completion_rx,
            pending_reply: None,
            snapshot_tx,
            cancel,
            countdown,
        };

        (actor, QuizSessionActorHandle { command_tx }, snapshot_rx)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Quiz session {} started", self.session.quiz_id());

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("Quiz session {} cancelled", self.session.quiz_id());
                    break;
                }
                Some(result) = self.completion_rx.recv() => {
                    self.finish_submission(result);
                }
                tick = next_tick(&mut self.tick_rx) => match tick {
                    Some(()) => self.on_tick(),
                    None => self.tick_rx = None,
                },
                command = self.command_rx.recv() => {
                    match command {
                        Some(QuizCommand::Shutdown) | None => {
                            info!("Quiz session {} shutting down", self.session.quiz_id());
                            break;
                        }
                        Some(command) => self.handle_command(command).await,
                    }
                }
            }
            self.publish();
        }

        self.countdown.cancel();
        info!("Quiz session {} shut down", self.session.quiz_id());
    }

    async fn handle_command(&mut self, command: QuizCommand) {
        match command {
            QuizCommand::SelectOption {
                question_id,
                option_id,
                respond_to,
            } => {
                let result = self.session.select_option(question_id, option_id);
                self.publish();
                let _ = respond_to.send(result).await;
            }
            QuizCommand::AnswerText {
                question_id,
                text,
                respond_to,
            } => {
                let result = self.session.answer_text(question_id, text);
                self.publish();
                let _ = respond_to.send(result).await;
            }
            QuizCommand::Navigate(navigation, respond_to) => {
                let index = match navigation {
                    Navigation::Next => self.session.next(),
                    Navigation::Previous => self.session.previous(),
                    Navigation::Index(index) => self.session.go_to(index),
                };
                self.publish();
                let _ = respond_to.send(index).await;
            }
            QuizCommand::Submit {
                confirmed,
                respond_to,
            } => match self.session.request_submit(confirmed) {
                Ok(SubmitDecision::NeedsConfirmation { unanswered }) => {
                    let _ = respond_to
                        .send(Ok(SubmitOutcome::NeedsConfirmation {
                            unanswered: unanswered.len(),
                        }))
                        .await;
                }
                Ok(SubmitDecision::Dispatch(payload)) => {
                    self.pending_reply = Some(respond_to);
                    self.publish();
                    self.dispatch(payload);
                }
                Err(e) => {
                    let _ = respond_to.send(Err(e)).await;
                }
            },
            QuizCommand::Shutdown => {}
        }
    }

    fn on_tick(&mut self) {
        match self.session.tick() {
            TickOutcome::AutoSubmit(payload) => self.dispatch(payload),
            TickOutcome::Running(_) | TickOutcome::Idle => {}
        }
    }

    fn dispatch(&self, payload: QuizSubmission) {
        let api = Arc::clone(&self.api);
        let completion_tx = self.completion_tx.clone();
        debug!(
            "Submitting quiz {} with {} answers",
            payload.quiz_id,
            payload.answers.len()
        );
        tokio::spawn(async move {
            let result = api.submit_quiz(&payload).await;
            let _ = completion_tx.send(result).await;
        });
    }

    fn finish_submission(&mut self, result: ClientResult<QuizAttemptResult>) {
        let reply = match result {
            Ok(attempt) => {
                self.session.submit_succeeded(attempt.clone());
                self.countdown.cancel();
                Ok(SubmitOutcome::Submitted(attempt))
            }
            Err(e) => {
                self.session.submit_failed(&e);
                Err(e)
            }
        };

        self.publish();
        if let Some(respond_to) = self.pending_reply.take() {
            // Capacity 1 and a single use, so this never waits
            let _ = respond_to.try_send(reply);
        }
    }

    /// Push the current state to subscribers; called before replying so callers see it
    fn publish(&self) {
        let snapshot = SessionSnapshot::of(&self.session);
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

/// Next countdown tick; never resolves for an untimed session
async fn next_tick(tick_rx: &mut Option<mpsc::Receiver<()>>) -> Option<()> {
    match tick_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
