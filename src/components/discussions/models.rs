use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course discussion as listed by `GET /discussions/course/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    #[serde(rename = "Discussionid")]
    pub id: i64,
    #[serde(rename = "Discussiontitle")]
    pub title: String,
    #[serde(rename = "Discussioncontent", default)]
    pub content: String,
    #[serde(rename = "Discussionpinned", default)]
    pub pinned: bool,
    #[serde(rename = "Discussionlocked", default)]
    pub locked: bool,
    #[serde(rename = "Discussionpublished", default = "default_true")]
    pub published: bool,
    #[serde(rename = "Courseid", default)]
    pub course_id: Option<i64>,
    #[serde(rename = "Authorid", default)]
    pub author_id: Option<i64>,
    #[serde(rename = "Authorrole", default)]
    pub author_role: Option<String>,
    #[serde(rename = "Authorname", default)]
    pub author_name: Option<String>,
    #[serde(rename = "Replycount", default)]
    pub reply_count: u32,
    #[serde(rename = "Createdat", default)]
    pub created_at: Option<String>,
    #[serde(rename = "Updatedat", default)]
    pub updated_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Discussion {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    /// Locked discussions show no reply composer
    pub fn composer_visible(&self) -> bool {
        !self.locked
    }
}

/// One reply; `replies` is filled when the server nests children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "Replyid")]
    pub id: i64,
    #[serde(rename = "Replycontent")]
    pub content: String,
    #[serde(rename = "Discussionid", default)]
    pub discussion_id: Option<i64>,
    #[serde(rename = "Parentreplyid", default)]
    pub parent_id: Option<i64>,
    #[serde(rename = "Authorid", default)]
    pub author_id: Option<i64>,
    #[serde(rename = "Authorrole", default)]
    pub author_role: Option<String>,
    #[serde(rename = "Authorname", default)]
    pub author_name: Option<String>,
    #[serde(rename = "Createdat", default)]
    pub created_at: Option<String>,
    #[serde(rename = "Updatedat", default)]
    pub updated_at: Option<String>,
    #[serde(rename = "Replies", default)]
    pub replies: Vec<Reply>,
}

/// `GET /discussions/{id}`: the discussion plus its replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionDetail {
    #[serde(flatten)]
    pub discussion: Discussion,
    #[serde(rename = "Replies", default)]
    pub replies: Vec<Reply>,
}

/// `GET /discussions/course/{id}` wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionListResponse {
    #[serde(rename = "Courseid", default)]
    pub course_id: Option<i64>,
    #[serde(rename = "Coursename", default)]
    pub course_name: Option<String>,
    #[serde(rename = "Totaldiscussions", default)]
    pub total: u32,
    #[serde(rename = "Discussions", default)]
    pub discussions: Vec<Discussion>,
}

/// The course listing arrives either wrapped or as a bare array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DiscussionListPayload {
    Wrapped(DiscussionListResponse),
    Bare(Vec<Discussion>),
}

impl DiscussionListPayload {
    pub fn into_discussions(self) -> Vec<Discussion> {
        match self {
            DiscussionListPayload::Wrapped(list) => list.discussions,
            DiscussionListPayload::Bare(discussions) => discussions,
        }
    }
}

/// Body of `POST /discussions/{id}/replies`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyCreateRequest {
    #[serde(rename = "Replycontent")]
    pub content: String,
    #[serde(rename = "Parentreplyid", skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<i64>,
}

/// Server timestamps come with or without an offset; offset-less ones are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Pinned first, then newest first; unparseable timestamps sort last within their group
pub fn sort_discussions(discussions: &mut [Discussion]) {
    discussions.sort_by(|a, b| {
        b.pinned
            .cmp(&a.pinned)
            .then_with(|| match (a.created(), b.created()) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
    });
}
