pub mod models;
pub mod thread;

use crate::api::LmsApi;
use crate::error::{validation_error, ClientResult};
use models::{sort_discussions, Discussion, DiscussionDetail, Reply, ReplyCreateRequest};
use std::sync::Arc;
use thread::{assemble_thread, flatten_replies, ThreadLine};
use tracing::{debug, info};

/// An opened discussion with its replies flattened for assembly
#[derive(Debug, Clone)]
pub struct DiscussionThread {
    pub discussion: Discussion,
    pub replies: Vec<Reply>,
}

impl DiscussionThread {
    pub fn from_detail(detail: DiscussionDetail) -> Self {
        Self {
            replies: flatten_replies(&detail.replies),
            discussion: detail.discussion,
        }
    }

    /// Replies in render order with their depth
    pub fn lines(&self) -> Vec<ThreadLine<'_>> {
        assemble_thread(&self.replies)
    }

    pub fn composer_visible(&self) -> bool {
        self.discussion.composer_visible()
    }
}

/// Course discussions: listing, reading and replying
#[derive(Clone)]
pub struct DiscussionService {
    api: Arc<dyn LmsApi>,
}

impl DiscussionService {
    pub fn new(api: Arc<dyn LmsApi>) -> Self {
        Self { api }
    }

    /// Discussions of a course, pinned first then newest first
    pub async fn list_for_course(&self, course_id: i64) -> ClientResult<Vec<Discussion>> {
        let mut discussions = self.api.course_discussions(course_id).await?;
        sort_discussions(&mut discussions);
        debug!("Course {} has {} discussions", course_id, discussions.len());
        Ok(discussions)
    }

    pub async fn open(&self, discussion_id: i64) -> ClientResult<DiscussionThread> {
        let detail = self.api.discussion(discussion_id).await?;
        Ok(DiscussionThread::from_detail(detail))
    }

    /// Post a reply and return the re-fetched thread.
    ///
    /// Empty content and locked discussions are rejected before any request is made.
    pub async fn reply(
        &self,
        thread: &DiscussionThread,
        content: &str,
        parent_id: Option<i64>,
    ) -> ClientResult<DiscussionThread> {
        if thread.discussion.locked {
            return Err(validation_error("This discussion is locked"));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(validation_error("Reply cannot be empty"));
        }

        let request = ReplyCreateRequest {
            content: content.to_string(),
            parent_id,
        };
        self.api.post_reply(thread.discussion.id, &request).await?;
        info!("Posted reply to discussion {}", thread.discussion.id);

        self.open(thread.discussion.id).await
    }
}
