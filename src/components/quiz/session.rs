//! Answer state and submit rules for one quiz attempt.
//!
//! Phases move `Loading -> Active -> Submitting -> Done`, or
//! `Active -> Expired -> Submitting` once the countdown runs out. A failed
//! submission goes back to `Active`, or to `Expired` when time is already up.

use super::models::{Answer, AnswerValue, Quiz, QuizAttemptResult, QuizQuestion, QuizSubmission};
use crate::error::{validation_error, ClientResult, Error};
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Loading,
    Active,
    Expired,
    Submitting,
    Done,
}

/// What a submit request resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Unanswered questions remain; the user has to confirm "submit anyway"
    NeedsConfirmation { unanswered: Vec<i64> },
    /// The session is now `Submitting`; send this payload
    Dispatch(QuizSubmission),
}

/// Result of one countdown tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Untimed, already at zero, or not in a phase where time counts
    Idle,
    Running(u32),
    /// Time just ran out on an active session; send this payload unconditionally
    AutoSubmit(QuizSubmission),
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz_id: i64,
    quiz: Option<Quiz>,
    phase: SessionPhase,
    current: usize,
    answers: HashMap<i64, Answer>,
    remaining: Option<u32>,
    expired: bool,
    result: Option<QuizAttemptResult>,
    last_error: Option<String>,
}

impl QuizSession {
    /// A session waiting for its quiz definition
    pub fn new(quiz_id: i64) -> Self {
        Self {
            quiz_id,
            quiz: None,
            phase: SessionPhase::Loading,
            current: 0,
            answers: HashMap::new(),
            remaining: None,
            expired: false,
            result: None,
            last_error: None,
        }
    }

    /// A session already holding its definition
    pub fn from_quiz(quiz: Quiz) -> Self {
        let mut session = Self::new(quiz.id);
        session.install(quiz);
        session
    }

    /// Install the fetched definition: one empty answer per question and, for timed quizzes,
    /// a countdown of `minutes * 60` seconds
    pub fn load(&mut self, quiz: Quiz) -> ClientResult<()> {
        if self.phase != SessionPhase::Loading {
            return Err(validation_error("Quiz is already loaded"));
        }
        if quiz.id != self.quiz_id {
            return Err(validation_error(&format!(
                "Expected quiz {} but received quiz {}",
                self.quiz_id, quiz.id
            )));
        }
        self.install(quiz);
        Ok(())
    }

    fn install(&mut self, mut quiz: Quiz) {
        quiz.sort_for_display();
        self.answers = quiz
            .questions
            .iter()
            .map(|q| (q.id, Answer::empty(q.id)))
            .collect();
        self.remaining = quiz
            .time_limit_minutes
            .filter(|minutes| *minutes > 0)
            .map(|minutes| minutes.saturating_mul(60));
        self.current = 0;
        self.phase = SessionPhase::Active;
        info!(
            "Quiz {} loaded with {} questions ({})",
            quiz.id,
            quiz.questions.len(),
            match self.remaining {
                Some(secs) => format!("{} seconds", secs),
                None => "untimed".to_string(),
            }
        );
        self.quiz = Some(quiz);
    }

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_timed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn result(&self) -> Option<&QuizAttemptResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn questions(&self) -> &[QuizQuestion] {
        self.quiz.as_ref().map(|q| q.questions.as_slice()).unwrap_or(&[])
    }

    pub fn question_count(&self) -> usize {
        self.questions().len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions().get(self.current)
    }

    pub fn answer(&self, question_id: i64) -> Option<&Answer> {
        self.answers.get(&question_id)
    }

    /// Move to the next question; stays on the last one
    pub fn next(&mut self) -> usize {
        if self.current + 1 < self.question_count() {
            self.current += 1;
        }
        self.current
    }

    /// Move to the previous question; stays on the first one
    pub fn previous(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Jump to a question, clamped to the last one
    pub fn go_to(&mut self, index: usize) -> usize {
        self.current = index.min(self.question_count().saturating_sub(1));
        self.current
    }

    fn ensure_editable(&self) -> ClientResult<()> {
        match self.phase {
            SessionPhase::Active | SessionPhase::Expired => Ok(()),
            SessionPhase::Loading => Err(validation_error("Quiz is still loading")),
            SessionPhase::Submitting => Err(Error::SubmitInFlight),
            SessionPhase::Done => Err(validation_error("Quiz has already been submitted")),
        }
    }

    fn find_question(&self, question_id: i64) -> ClientResult<&QuizQuestion> {
        self.questions()
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| validation_error(&format!("Unknown question {}", question_id)))
    }

    /// Pick an option, replacing any earlier pick for that question
    pub fn select_option(&mut self, question_id: i64, option_id: i64) -> ClientResult<()> {
        self.ensure_editable()?;
        let question = self.find_question(question_id)?;
        if !question.question_type.uses_options() {
            return Err(validation_error(&format!(
                "Question {} takes a written answer",
                question_id
            )));
        }
        if !question.options.iter().any(|o| o.id == option_id) {
            return Err(validation_error(&format!(
                "Option {} does not belong to question {}",
                option_id, question_id
            )));
        }
        self.answers.insert(
            question_id,
            Answer {
                question_id,
                value: AnswerValue::Option(option_id),
            },
        );
        Ok(())
    }

    /// Set the written answer of a question
    pub fn answer_text(&mut self, question_id: i64, text: impl Into<String>) -> ClientResult<()> {
        self.ensure_editable()?;
        let question = self.find_question(question_id)?;
        if question.question_type.uses_options() {
            return Err(validation_error(&format!(
                "Question {} is answered by selecting an option",
                question_id
            )));
        }
        self.answers.insert(
            question_id,
            Answer {
                question_id,
                value: AnswerValue::Text(text.into()),
            },
        );
        Ok(())
    }

    /// Ids of questions with neither an option nor non-empty text, in question order
    pub fn unanswered(&self) -> Vec<i64> {
        self.questions()
            .iter()
            .filter(|q| !self.answers.get(&q.id).map(Answer::is_answered).unwrap_or(false))
            .map(|q| q.id)
            .collect()
    }

    /// Payload with one tuple per question, answered or not
    pub fn submission(&self) -> QuizSubmission {
        QuizSubmission {
            quiz_id: self.quiz_id,
            answers: self
                .questions()
                .iter()
                .map(|q| {
                    self.answers
                        .get(&q.id)
                        .cloned()
                        .unwrap_or_else(|| Answer::empty(q.id))
                        .to_submission()
                })
                .collect(),
        }
    }

    /// Manual submit. `confirmed` is the user's "submit anyway".
    ///
    /// Confirmation is skipped once the countdown has hit zero.
    pub fn request_submit(&mut self, confirmed: bool) -> ClientResult<SubmitDecision> {
        match self.phase {
            SessionPhase::Loading => return Err(validation_error("Quiz is still loading")),
            SessionPhase::Submitting => return Err(Error::SubmitInFlight),
            SessionPhase::Done => return Err(validation_error("Quiz has already been submitted")),
            SessionPhase::Active | SessionPhase::Expired => {}
        }

        let time_up = self.phase == SessionPhase::Expired || self.remaining == Some(0);
        let unanswered = self.unanswered();
        if !unanswered.is_empty() && !confirmed && !time_up {
            debug!(
                "Quiz {} has {} unanswered questions, asking for confirmation",
                self.quiz_id,
                unanswered.len()
            );
            return Ok(SubmitDecision::NeedsConfirmation { unanswered });
        }

        self.phase = SessionPhase::Submitting;
        self.last_error = None;
        Ok(SubmitDecision::Dispatch(self.submission()))
    }

    /// One elapsed second.
    ///
    /// Time keeps running while a submission is in flight, so a failed submit does not
    /// resume from a paused value.
    pub fn tick(&mut self) -> TickOutcome {
        let remaining = match self.remaining {
            Some(secs) if secs > 0 => secs,
            _ => return TickOutcome::Idle,
        };
        if !matches!(self.phase, SessionPhase::Active | SessionPhase::Submitting) {
            return TickOutcome::Idle;
        }

        let remaining = remaining - 1;
        self.remaining = Some(remaining);
        if remaining > 0 {
            return TickOutcome::Running(remaining);
        }

        self.expired = true;
        if self.phase == SessionPhase::Submitting {
            debug!("Quiz {} time ran out during a submission", self.quiz_id);
            return TickOutcome::Running(0);
        }

        // Expired hands straight over to the automatic submission
        info!("Quiz {} time is up, submitting", self.quiz_id);
        self.phase = SessionPhase::Submitting;
        self.last_error = None;
        TickOutcome::AutoSubmit(self.submission())
    }

    /// The in-flight submission was accepted; the session is finished
    pub fn submit_succeeded(&mut self, result: QuizAttemptResult) {
        if self.phase != SessionPhase::Submitting {
            warn!("Ignoring submit result for quiz {} in {:?}", self.quiz_id, self.phase);
            return;
        }
        info!("Quiz {} submitted as attempt {}", self.quiz_id, result.attempt_id);
        self.phase = SessionPhase::Done;
        self.result = Some(result);
        self.last_error = None;
    }

    /// The in-flight submission failed; answers are kept for a manual retry
    pub fn submit_failed(&mut self, error: &Error) {
        if self.phase != SessionPhase::Submitting {
            warn!("Ignoring submit failure for quiz {} in {:?}", self.quiz_id, self.phase);
            return;
        }
        self.phase = if self.expired {
            SessionPhase::Expired
        } else {
            SessionPhase::Active
        };
        warn!("Quiz {} submission failed: {}", self.quiz_id, error);
        self.last_error = Some(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::quiz::models::{QuestionType, QuizOption};

    fn mc(id: i64, order: i32, options: &[i64]) -> QuizQuestion {
        QuizQuestion {
            id,
            text: format!("Question {}", id),
            question_type: QuestionType::MultipleChoice,
            points: 1,
            order,
            options: options
                .iter()
                .enumerate()
                .map(|(i, oid)| QuizOption {
                    id: *oid,
                    text: format!("Option {}", oid),
                    order: i as i32,
                })
                .collect(),
        }
    }

    fn essay(id: i64, order: i32) -> QuizQuestion {
        QuizQuestion {
            id,
            text: format!("Essay {}", id),
            question_type: QuestionType::Essay,
            points: 5,
            order,
            options: Vec::new(),
        }
    }

    fn sample_quiz(time_limit_minutes: Option<u32>) -> Quiz {
        Quiz {
            id: 77,
            name: "Sample".to_string(),
            description: None,
            course_id: Some(1),
            time_limit_minutes,
            questions: vec![mc(1, 0, &[10, 11]), essay(2, 1), mc(3, 2, &[30, 31])],
        }
    }

    #[test]
    fn load_seeds_answers_and_countdown() {
        let mut session = QuizSession::new(77);
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(session.select_option(1, 10).is_err());

        session.load(sample_quiz(Some(1))).unwrap();
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.remaining_seconds(), Some(60));
        assert_eq!(session.unanswered(), vec![1, 2, 3]);
        assert!(session.load(sample_quiz(None)).is_err());

        let untimed = QuizSession::from_quiz(sample_quiz(None));
        assert!(!untimed.is_timed());
    }

    #[test]
    fn huge_time_limit_saturates_countdown() {
        let session = QuizSession::from_quiz(sample_quiz(Some(80_000_000)));
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.remaining_seconds(), Some(u32::MAX));

        let session = QuizSession::from_quiz(sample_quiz(Some(u32::MAX / 60)));
        assert_eq!(session.remaining_seconds(), Some(u32::MAX / 60 * 60));
    }

    #[test]
    fn load_rejects_wrong_quiz_and_sorts_questions() {
        let mut session = QuizSession::new(5);
        assert!(session.load(sample_quiz(None)).is_err());

        let mut quiz = sample_quiz(None);
        quiz.questions.reverse();
        let session = QuizSession::from_quiz(quiz);
        assert_eq!(session.current_question().map(|q| q.id), Some(1));
    }

    #[test]
    fn selecting_new_option_replaces_previous() {
        let mut session = QuizSession::from_quiz(sample_quiz(None));
        session.select_option(1, 11).unwrap();
        session.select_option(1, 10).unwrap();
        let answer = session.answer(1).unwrap();
        assert_eq!(answer.value, AnswerValue::Option(10));
        assert_eq!(session.submission().answers[0].selected_option_id, Some(10));
        assert_eq!(session.submission().answers[0].answer_text, None);
    }

    #[test]
    fn answers_are_validated_against_the_question() {
        let mut session = QuizSession::from_quiz(sample_quiz(None));
        assert!(session.select_option(1, 30).is_err());
        assert!(session.select_option(2, 10).is_err());
        assert!(session.answer_text(1, "four").is_err());
        assert!(session.answer_text(99, "x").is_err());
        session.answer_text(2, "An essay").unwrap();
        assert_eq!(session.unanswered(), vec![1, 3]);
        // Other answers untouched
        assert_eq!(session.answer(1).unwrap().value, AnswerValue::Unanswered);
    }

    #[test]
    fn payload_has_a_tuple_per_question() {
        let mut session = QuizSession::from_quiz(sample_quiz(None));
        session.answer_text(2, "Only this one").unwrap();
        let payload = session.submission();
        assert_eq!(payload.quiz_id, 77);
        assert_eq!(payload.answers.len(), 3);
        assert_eq!(payload.answers[0].selected_option_id, None);
        assert_eq!(payload.answers[0].answer_text, None);
        assert_eq!(payload.answers[1].answer_text.as_deref(), Some("Only this one"));
        assert_eq!(payload.answers[2].selected_option_id, None);
        assert_eq!(payload.answers[2].answer_text, None);
    }

    #[test]
    fn manual_submit_requires_confirmation_when_incomplete() {
        let mut session = QuizSession::from_quiz(sample_quiz(None));
        session.select_option(1, 10).unwrap();

        let decision = session.request_submit(false).unwrap();
        assert_eq!(
            decision,
            SubmitDecision::NeedsConfirmation { unanswered: vec![2, 3] }
        );
        assert_eq!(session.phase(), SessionPhase::Active);

        match session.request_submit(true).unwrap() {
            SubmitDecision::Dispatch(payload) => assert_eq!(payload.answers.len(), 3),
            other => panic!("expected dispatch, got {:?}", other),
        }
        assert_eq!(session.phase(), SessionPhase::Submitting);
    }

    #[test]
    fn complete_quiz_dispatches_immediately_and_blocks_duplicates() {
        let mut session = QuizSession::from_quiz(sample_quiz(None));
        session.select_option(1, 10).unwrap();
        session.answer_text(2, "text").unwrap();
        session.select_option(3, 31).unwrap();

        assert!(matches!(
            session.request_submit(false).unwrap(),
            SubmitDecision::Dispatch(_)
        ));
        assert!(matches!(session.request_submit(true), Err(Error::SubmitInFlight)));
        assert!(matches!(session.select_option(1, 11), Err(Error::SubmitInFlight)));

        session.submit_succeeded(QuizAttemptResult {
            attempt_id: 5,
            score: Some(2),
            max_score: Some(7),
            graded: false,
            feedback: None,
        });
        assert_eq!(session.phase(), SessionPhase::Done);
        assert!(session.request_submit(true).is_err());
    }

    #[test]
    fn failed_submit_returns_to_active_and_keeps_answers() {
        let mut session = QuizSession::from_quiz(sample_quiz(Some(1)));
        session.select_option(3, 30).unwrap();
        session.request_submit(true).unwrap();

        // Time keeps elapsing during the request
        assert_eq!(session.tick(), TickOutcome::Running(59));

        session.submit_failed(&validation_error("Server down"));
        assert_eq!(session.phase(), SessionPhase::Active);
        assert_eq!(session.last_error(), Some("Server down"));
        assert_eq!(session.remaining_seconds(), Some(59));
        assert_eq!(session.answer(3).unwrap().value, AnswerValue::Option(30));
    }

    #[test]
    fn countdown_expiry_auto_submits_without_confirmation() {
        let mut session = QuizSession::from_quiz(sample_quiz(Some(1)));
        assert_eq!(session.remaining_seconds(), Some(60));

        for expected in (1..60).rev() {
            assert_eq!(session.tick(), TickOutcome::Running(expected));
        }
        match session.tick() {
            TickOutcome::AutoSubmit(payload) => {
                assert_eq!(payload.answers.len(), 3);
                assert!(payload.answers.iter().all(|a| a.selected_option_id.is_none()));
            }
            other => panic!("expected auto submit, got {:?}", other),
        }
        assert_eq!(session.phase(), SessionPhase::Submitting);
        assert_eq!(session.tick(), TickOutcome::Idle);

        session.submit_failed(&validation_error("offline"));
        assert_eq!(session.phase(), SessionPhase::Expired);

        // A manual retry after expiry skips the confirmation
        assert!(matches!(
            session.request_submit(false).unwrap(),
            SubmitDecision::Dispatch(_)
        ));
    }

    #[test]
    fn expiry_during_submission_is_remembered() {
        let mut session = QuizSession::from_quiz(sample_quiz(Some(1)));
        for _ in 0..59 {
            session.tick();
        }
        session.request_submit(true).unwrap();
        assert_eq!(session.tick(), TickOutcome::Running(0));
        session.submit_failed(&validation_error("timeout"));
        assert_eq!(session.phase(), SessionPhase::Expired);
    }

    #[test]
    fn navigation_never_blocks() {
        let mut session = QuizSession::from_quiz(sample_quiz(None));
        assert_eq!(session.previous(), 0);
        assert_eq!(session.next(), 1);
        assert_eq!(session.next(), 2);
        assert_eq!(session.next(), 2);
        assert_eq!(session.go_to(10), 2);
        assert_eq!(session.go_to(0), 0);
        assert_eq!(session.unanswered().len(), 3);
    }

    #[test]
    fn untimed_session_ignores_ticks() {
        let mut session = QuizSession::from_quiz(sample_quiz(None));
        assert_eq!(session.tick(), TickOutcome::Idle);
        assert_eq!(session.phase(), SessionPhase::Active);
    }
}
