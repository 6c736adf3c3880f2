use super::auth::TokenResponse;
use super::LmsApi;
use crate::components::calendar::models::CalendarEventsResponse;
use crate::components::calendar::time::MonthRange;
use crate::components::discussions::models::{
    Discussion, DiscussionDetail, DiscussionListPayload, ReplyCreateRequest,
};
use crate::components::messages::models::{
    ConversationDetail, Inbox, InboxPayload, MessageCreateRequest,
};
use crate::components::quiz::models::{Quiz, QuizAttemptResult, QuizSubmission};
use crate::config::{normalize_base_url, Config};
use crate::context::AppContext;
use crate::error::{ClientResult, Error, SESSION_EXPIRED_MESSAGE};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// reqwest-backed client for the Go-Canvas REST API.
///
/// Every request carries the context's bearer token when one is present.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    context: AppContext,
}

impl ApiClient {
    pub fn new(config: &Config, context: AppContext) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: normalize_base_url(&config.api_base_url)?,
            client,
            context,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| Error::Other(format!("Failed to build URL for {}: {}", path, e)))
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.context.token().await {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Send the request and return the body of a successful response
    async fn send(&self, request: RequestBuilder) -> ClientResult<String> {
        let response = self
            .authorize(request)
            .await
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let detail = error_detail(status, &body);
            warn!("Request failed: HTTP {} - {}", status.as_u16(), detail);
            return Err(Error::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(body)
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else if err.is_connect() {
            "Make sure the backend is running.".to_string()
        } else {
            err.to_string()
        };
        Error::Transport {
            base_url: self.base_url.clone(),
            message,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let body = self.send(self.client.get(url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> ClientResult<T> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let body = self.send(self.client.post(url).json(payload)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST whose response body is not needed
    async fn post_unit<B: Serialize + Sync>(&self, path: &str, payload: Option<&B>) -> ClientResult<()> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let request = match payload {
            Some(payload) => self.client.post(url).json(payload),
            None => self.client.post(url),
        };
        self.send(request).await?;
        Ok(())
    }
}

/// Human-readable message for a failed response.
///
/// Order: the JSON `detail` (strings as-is, anything else JSON-encoded), then `message`,
/// then the raw body, then the status reason. A 401 that carries none of the structured
/// fields reports an expired session.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    let structured = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            let detail = json.get("detail").filter(|d| !is_blank(d)).map(|d| match d {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            });
            detail.or_else(|| {
                json.get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
        });

    if let Some(message) = structured {
        return message;
    }
    if status == StatusCode::UNAUTHORIZED {
        return SESSION_EXPIRED_MESSAGE.to_string();
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[async_trait]
impl LmsApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> ClientResult<TokenResponse> {
        let url = self.url("/token")?;
        debug!("POST {} for {}", url, username);
        let form = [
            ("username", username),
            ("password", password),
            ("grant_type", "password"),
        ];
        // The token endpoint is called without a bearer header
        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                detail: error_detail(status, &body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn calendar_events(
        &self,
        range: &MonthRange,
        course_id: Option<i64>,
    ) -> ClientResult<CalendarEventsResponse> {
        let (start_date, end_date) = range.query_dates();
        let mut url = self.url("/calendar/events")?;
        url.query_pairs_mut()
            .append_pair("start_date", &start_date)
            .append_pair("end_date", &end_date);
        if let Some(course_id) = course_id {
            url.query_pairs_mut()
                .append_pair("courseid", &course_id.to_string());
        }

        debug!("GET {}", url);
        let body = self.send(self.client.get(url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn sync_calendar(&self) -> ClientResult<()> {
        self.post_unit::<()>("/calendar/sync", None).await
    }

    async fn quiz(&self, quiz_id: i64) -> ClientResult<Quiz> {
        self.get_json(&format!("/quiz/{}", quiz_id)).await
    }

    async fn submit_quiz(&self, submission: &QuizSubmission) -> ClientResult<QuizAttemptResult> {
        self.post_json(&format!("/quiz/{}/submit", submission.quiz_id), submission)
            .await
    }

    async fn course_discussions(&self, course_id: i64) -> ClientResult<Vec<Discussion>> {
        let payload: DiscussionListPayload = self
            .get_json(&format!("/discussions/course/{}", course_id))
            .await?;
        Ok(payload.into_discussions())
    }

    async fn discussion(&self, discussion_id: i64) -> ClientResult<DiscussionDetail> {
        self.get_json(&format!("/discussions/{}", discussion_id)).await
    }

    async fn post_reply(&self, discussion_id: i64, request: &ReplyCreateRequest) -> ClientResult<()> {
        self.post_unit(&format!("/discussions/{}/replies", discussion_id), Some(request))
            .await
    }

    async fn inbox(&self) -> ClientResult<Inbox> {
        let payload: InboxPayload = self.get_json("/messages/inbox").await?;
        Ok(payload.into_inbox())
    }

    async fn conversation(&self, conversation_id: i64) -> ClientResult<ConversationDetail> {
        self.get_json(&format!("/messages/conversations/{}", conversation_id))
            .await
    }

    async fn send_message(
        &self,
        conversation_id: i64,
        request: &MessageCreateRequest,
    ) -> ClientResult<()> {
        self.post_unit(
            &format!("/messages/conversations/{}/messages", conversation_id),
            Some(request),
        )
        .await
    }
}
