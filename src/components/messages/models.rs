use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "Userid")]
    pub user_id: i64,
    #[serde(rename = "Userrole", default)]
    pub role: Option<String>,
    #[serde(rename = "Username", default)]
    pub name: Option<String>,
    #[serde(rename = "Isunread", default)]
    pub is_unread: bool,
}

impl Participant {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("User {}", self.user_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "Messageid")]
    pub id: i64,
    #[serde(rename = "Conversationid", default)]
    pub conversation_id: Option<i64>,
    #[serde(rename = "Senderid", default)]
    pub sender_id: Option<i64>,
    #[serde(rename = "Senderrole", default)]
    pub sender_role: Option<String>,
    #[serde(rename = "Sendername", default)]
    pub sender_name: Option<String>,
    #[serde(rename = "Messagecontent")]
    pub content: String,
    #[serde(rename = "Isread", default)]
    pub is_read: bool,
    #[serde(rename = "Createdat", default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "Conversationid")]
    pub id: i64,
    #[serde(rename = "Conversationsubject", default)]
    pub subject: Option<String>,
    #[serde(rename = "Participants", alias = "participants", default)]
    pub participants: Vec<Participant>,
    #[serde(rename = "Unreadcount", default)]
    pub unread_count: u32,
    #[serde(rename = "Lastmessage", default)]
    pub last_message: Option<String>,
    #[serde(rename = "Lastmessagedate", default)]
    pub last_message_date: Option<String>,
}

impl Conversation {
    /// Unread as flagged by the server on any participant entry
    pub fn has_unread(&self) -> bool {
        self.participants.iter().any(|p| p.is_unread)
    }

    /// Names of everyone except the given user, joined for a list row
    pub fn participant_names(&self, exclude_user_id: Option<i64>) -> String {
        let names: Vec<String> = self
            .participants
            .iter()
            .filter(|p| Some(p.user_id) != exclude_user_id)
            .map(Participant::display_name)
            .collect();
        names.join(", ")
    }

    pub fn is_group(&self) -> bool {
        self.participants.len() > 2
    }

    /// Conversations have no lock, the composer is always shown
    pub fn composer_visible(&self) -> bool {
        true
    }
}

/// `GET /messages/conversations/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationDetail {
    #[serde(flatten)]
    pub conversation: Conversation,
    #[serde(rename = "Messages", alias = "messages", default)]
    pub messages: Vec<Message>,
}

/// `GET /messages/inbox`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inbox {
    #[serde(rename = "Totalconversations", default)]
    pub total_conversations: u32,
    #[serde(rename = "Unreadconversations", default)]
    pub unread_conversations: u32,
    #[serde(rename = "Conversations", alias = "conversations", default)]
    pub conversations: Vec<Conversation>,
}

impl Inbox {
    /// Conversations in server order, each paired with its unread flag for highlighting
    pub fn rows(&self) -> impl Iterator<Item = (&Conversation, bool)> {
        self.conversations.iter().map(|c| (c, c.has_unread()))
    }
}

/// The inbox arrives either with its counters or as a bare conversation array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboxPayload {
    Full(Inbox),
    Bare(Vec<Conversation>),
}

impl InboxPayload {
    pub fn into_inbox(self) -> Inbox {
        match self {
            InboxPayload::Full(inbox) => inbox,
            InboxPayload::Bare(conversations) => Inbox {
                total_conversations: conversations.len() as u32,
                unread_conversations: conversations.iter().filter(|c| c.has_unread()).count()
                    as u32,
                conversations,
            },
        }
    }
}

/// Body of `POST /messages/conversations/{id}/messages`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreateRequest {
    #[serde(rename = "Messagecontent")]
    pub content: String,
}
