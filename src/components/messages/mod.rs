pub mod models;

use crate::api::LmsApi;
use crate::error::{validation_error, ClientResult};
use models::{ConversationDetail, Inbox, MessageCreateRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// Inbox and conversation access
#[derive(Clone)]
pub struct MessageService {
    api: Arc<dyn LmsApi>,
}

impl MessageService {
    pub fn new(api: Arc<dyn LmsApi>) -> Self {
        Self { api }
    }

    /// Inbox in server order
    pub async fn inbox(&self) -> ClientResult<Inbox> {
        let inbox = self.api.inbox().await?;
        debug!(
            "Inbox has {} conversations, {} unread",
            inbox.total_conversations, inbox.unread_conversations
        );
        Ok(inbox)
    }

    pub async fn open(&self, conversation_id: i64) -> ClientResult<ConversationDetail> {
        self.api.conversation(conversation_id).await
    }

    /// Send a message and return the re-fetched conversation
    pub async fn send(&self, conversation_id: i64, content: &str) -> ClientResult<ConversationDetail> {
        let content = content.trim();
        if content.is_empty() {
            return Err(validation_error("Message cannot be empty"));
        }

        let request = MessageCreateRequest {
            content: content.to_string(),
        };
        self.api.send_message(conversation_id, &request).await?;
        info!("Sent message to conversation {}", conversation_id);

        self.open(conversation_id).await
    }
}
