#![allow(dead_code)]

use async_trait::async_trait;
use gocanvas_client::api::{LmsApi, TokenResponse};
use gocanvas_client::components::calendar::models::{CalendarEvent, CalendarEventsResponse, EventType};
use gocanvas_client::components::calendar::time::MonthRange;
use gocanvas_client::components::discussions::models::{
    Discussion, DiscussionDetail, Reply, ReplyCreateRequest,
};
use gocanvas_client::components::messages::models::{
    Conversation, ConversationDetail, Inbox, Message, MessageCreateRequest, Participant,
};
use gocanvas_client::components::quiz::models::{
    QuestionType, Quiz, QuizAttemptResult, QuizOption, QuizQuestion, QuizSubmission,
};
use gocanvas_client::error::{ClientResult, Error};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// In-memory stand-in for the Go-Canvas server that records every mutation
#[derive(Default)]
pub struct MockLmsApi {
    pub quizzes: Mutex<HashMap<i64, Quiz>>,
    pub events: Mutex<Vec<CalendarEvent>>,
    pub discussions: Mutex<Vec<Discussion>>,
    pub details: Mutex<HashMap<i64, DiscussionDetail>>,
    pub inbox: Mutex<Inbox>,
    pub conversations: Mutex<HashMap<i64, ConversationDetail>>,

    pub calendar_queries: Mutex<Vec<(String, String, Option<i64>)>>,
    pub sync_calls: AtomicUsize,
    pub submissions: Mutex<Vec<QuizSubmission>>,
    pub replies: Mutex<Vec<(i64, ReplyCreateRequest)>>,
    pub messages: Mutex<Vec<(i64, MessageCreateRequest)>>,

    /// Number of upcoming submits that fail with a 500
    pub submit_failures: AtomicUsize,
    /// How long a submit takes to answer
    pub submit_delay: Mutex<Option<Duration>>,
}

impl MockLmsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_quiz(self, quiz: Quiz) -> Self {
        self.quizzes.lock().await.insert(quiz.id, quiz);
        self
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.lock().await.len()
    }
}

fn not_found(what: &str) -> Error {
    Error::Api {
        status: 404,
        detail: format!("{} not found", what),
    }
}

#[async_trait]
impl LmsApi for MockLmsApi {
    async fn login(&self, username: &str, password: &str) -> ClientResult<TokenResponse> {
        if password != "secret" {
            return Err(Error::Api {
                status: 401,
                detail: "Incorrect username or password".to_string(),
            });
        }
        Ok(TokenResponse {
            access_token: format!("token-for-{}", username),
            token_type: "bearer".to_string(),
        })
    }

    async fn calendar_events(
        &self,
        range: &MonthRange,
        course_id: Option<i64>,
    ) -> ClientResult<CalendarEventsResponse> {
        let (start_date, end_date) = range.query_dates();
        self.calendar_queries
            .lock()
            .await
            .push((start_date.clone(), end_date.clone(), course_id));

        let events: Vec<CalendarEvent> = self
            .events
            .lock()
            .await
            .iter()
            .filter(|e| course_id.is_none() || e.course_id == course_id)
            .cloned()
            .collect();
        Ok(CalendarEventsResponse {
            start_date,
            end_date,
            total_events: events.len(),
            events,
        })
    }

    async fn sync_calendar(&self) -> ClientResult<()> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn quiz(&self, quiz_id: i64) -> ClientResult<Quiz> {
        self.quizzes
            .lock()
            .await
            .get(&quiz_id)
            .cloned()
            .ok_or_else(|| not_found("Quiz"))
    }

    async fn submit_quiz(&self, submission: &QuizSubmission) -> ClientResult<QuizAttemptResult> {
        let delay = *self.submit_delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .submit_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Api {
                status: 500,
                detail: "Could not save attempt".to_string(),
            });
        }

        let mut submissions = self.submissions.lock().await;
        submissions.push(submission.clone());
        Ok(QuizAttemptResult {
            attempt_id: submissions.len() as i64,
            score: Some(0),
            max_score: Some(7),
            graded: false,
            feedback: None,
        })
    }

    async fn course_discussions(&self, course_id: i64) -> ClientResult<Vec<Discussion>> {
        Ok(self
            .discussions
            .lock()
            .await
            .iter()
            .filter(|d| d.course_id == Some(course_id))
            .cloned()
            .collect())
    }

    async fn discussion(&self, discussion_id: i64) -> ClientResult<DiscussionDetail> {
        self.details
            .lock()
            .await
            .get(&discussion_id)
            .cloned()
            .ok_or_else(|| not_found("Discussion"))
    }

    async fn post_reply(&self, discussion_id: i64, request: &ReplyCreateRequest) -> ClientResult<()> {
        let mut details = self.details.lock().await;
        let detail = details
            .get_mut(&discussion_id)
            .ok_or_else(|| not_found("Discussion"))?;
        let id = 1000 + self.replies.lock().await.len() as i64;
        detail.replies.push(reply(id, &request.content, request.parent_id));
        self.replies.lock().await.push((discussion_id, request.clone()));
        Ok(())
    }

    async fn inbox(&self) -> ClientResult<Inbox> {
        Ok(self.inbox.lock().await.clone())
    }

    async fn conversation(&self, conversation_id: i64) -> ClientResult<ConversationDetail> {
        self.conversations
            .lock()
            .await
            .get(&conversation_id)
            .cloned()
            .ok_or_else(|| not_found("Conversation"))
    }

    async fn send_message(
        &self,
        conversation_id: i64,
        request: &MessageCreateRequest,
    ) -> ClientResult<()> {
        let mut conversations = self.conversations.lock().await;
        let detail = conversations
            .get_mut(&conversation_id)
            .ok_or_else(|| not_found("Conversation"))?;
        detail.messages.push(Message {
            id: detail.messages.len() as i64 + 1,
            conversation_id: Some(conversation_id),
            sender_id: Some(7),
            sender_role: Some("student".to_string()),
            sender_name: Some("Me".to_string()),
            content: request.content.clone(),
            is_read: true,
            created_at: None,
        });
        self.messages.lock().await.push((conversation_id, request.clone()));
        Ok(())
    }
}

fn multiple_choice(id: i64, order: i32, options: &[i64]) -> QuizQuestion {
    QuizQuestion {
        id,
        text: format!("Question {}", id),
        question_type: QuestionType::MultipleChoice,
        points: 1,
        order,
        options: options
            .iter()
            .enumerate()
            .map(|(i, option_id)| QuizOption {
                id: *option_id,
                text: format!("Option {}", option_id),
                order: i as i32,
            })
            .collect(),
    }
}

/// Three questions: multiple choice (options 10, 11), essay, multiple choice (options 30, 31)
pub fn sample_quiz(id: i64, time_limit_minutes: Option<u32>) -> Quiz {
    Quiz {
        id,
        name: "Week 3 check".to_string(),
        description: None,
        course_id: Some(1),
        time_limit_minutes,
        questions: vec![
            multiple_choice(1, 0, &[10, 11]),
            QuizQuestion {
                id: 2,
                text: "Explain".to_string(),
                question_type: QuestionType::Essay,
                points: 5,
                order: 1,
                options: Vec::new(),
            },
            multiple_choice(3, 2, &[30, 31]),
        ],
    }
}

pub fn event(id: i64, start: &str, event_type: &str, course_id: Option<i64>) -> CalendarEvent {
    CalendarEvent {
        id,
        title: format!("Event {}", id),
        description: None,
        event_type: EventType::from(event_type.to_string()),
        start: start.to_string(),
        end: None,
        all_day: false,
        color: None,
        course_id,
        course_name: None,
        reference_type: None,
        reference_id: None,
    }
}

pub fn discussion(id: i64, pinned: bool, locked: bool, created_at: &str) -> Discussion {
    Discussion {
        id,
        title: format!("Topic {}", id),
        content: "Body".to_string(),
        pinned,
        locked,
        published: true,
        course_id: Some(1),
        author_id: Some(2),
        author_role: Some("faculty".to_string()),
        author_name: Some("Prof".to_string()),
        reply_count: 0,
        created_at: Some(created_at.to_string()),
        updated_at: None,
    }
}

pub fn reply(id: i64, content: &str, parent_id: Option<i64>) -> Reply {
    Reply {
        id,
        content: content.to_string(),
        discussion_id: None,
        parent_id,
        author_id: Some(7),
        author_role: Some("student".to_string()),
        author_name: None,
        created_at: None,
        updated_at: None,
        replies: Vec::new(),
    }
}

pub fn conversation(id: i64, unread_for: &[i64]) -> Conversation {
    Conversation {
        id,
        subject: Some(format!("Thread {}", id)),
        participants: [7, 8]
            .iter()
            .map(|user_id| Participant {
                user_id: *user_id,
                role: Some("student".to_string()),
                name: Some(format!("User {}", user_id)),
                is_unread: unread_for.contains(user_id),
            })
            .collect(),
        unread_count: 0,
        last_message: None,
        last_message_date: None,
    }
}
