use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::{SessionToken, StoryId};

/// A story exactly as the server sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPayload {
    pub story_id: StoryId,
    pub title: String,
    pub author: String,
    pub url: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A user as the server sends it. The server calls the user's own
/// submissions `stories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub favorites: Vec<StoryPayload>,
    #[serde(default)]
    pub stories: Vec<StoryPayload>,
}

/// Response to signup and login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: SessionToken,
    pub user: UserPayload,
}

/// Fields a user fills in when submitting a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStory {
    pub title: String,
    pub author: String,
    pub url: String,
}

#[derive(Deserialize)]
struct StoriesEnvelope {
    stories: Vec<StoryPayload>,
}

#[derive(Deserialize)]
struct StoryEnvelope {
    story: StoryPayload,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: UserPayload,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    title: Option<String>,
}

/// The remote story service. Every method is one request with no retries.
pub trait StoryApi: Send + Sync {
    fn fetch_stories(&self) -> Result<Vec<StoryPayload>>;

    fn create_story(&self, token: &SessionToken, story: &NewStory) -> Result<StoryPayload>;

    fn delete_story(&self, token: &SessionToken, story_id: &StoryId) -> Result<()>;

    fn signup(&self, username: &str, password: &str, name: &str) -> Result<AuthPayload>;

    fn login(&self, username: &str, password: &str) -> Result<AuthPayload>;

    /// Used to restore a session from stored credentials.
    fn fetch_user(&self, username: &str, token: &SessionToken) -> Result<UserPayload>;

    fn add_favorite(
        &self,
        token: &SessionToken,
        username: &str,
        story_id: &StoryId,
    ) -> Result<UserPayload>;

    fn remove_favorite(
        &self,
        token: &SessionToken,
        username: &str,
        story_id: &StoryId,
    ) -> Result<UserPayload>;
}

/// `StoryApi` over HTTPS. The token travels in the query string for GET
/// and in the JSON body otherwise, never in a header.
pub struct HttpStoryApi {
    client: Client,
    base_url: Url,
}

impl HttpStoryApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("hack_or_snooze/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(ClientError::Setup)?;
        Ok(Self::from_client(client, config.base_url.clone()))
    }

    pub fn from_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Joins percent-encoded path segments onto the base url.
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.as_str().trim_end_matches('/').to_string();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    /// Performs `request` and returns the body of a 2xx response.
    fn execute(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().map_err(ClientError::Network)?;
        let status = response.status();
        let body = response.text().map_err(ClientError::Network)?;

        if !status.is_success() {
            let message = error_message(status, &body);
            debug!(status = status.as_u16(), %message, "Request rejected");
            return Err(ClientError::api(status.as_u16(), message));
        }

        Ok(body)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.execute(request)?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Pulls the human readable message out of an error response, falling back
/// to the status' reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(message) = envelope.error.message.or(envelope.error.title) {
            return message;
        }
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

impl StoryApi for HttpStoryApi {
    fn fetch_stories(&self) -> Result<Vec<StoryPayload>> {
        let url = self.endpoint(&["stories"]);
        debug!(%url, "Fetching stories");

        let envelope: StoriesEnvelope = self.send(self.client.get(&url))?;
        Ok(envelope.stories)
    }

    fn create_story(&self, token: &SessionToken, story: &NewStory) -> Result<StoryPayload> {
        let url = self.endpoint(&["stories"]);
        debug!(%url, title = %story.title, "Creating story");

        let body = json!({ "token": token.as_str(), "story": story });
        let envelope: StoryEnvelope = self.send(self.client.post(&url).json(&body))?;
        Ok(envelope.story)
    }

    fn delete_story(&self, token: &SessionToken, story_id: &StoryId) -> Result<()> {
        let url = self.endpoint(&["stories", story_id.as_str()]);
        debug!(%url, "Deleting story");

        // Success is the status alone; the body may be empty
        let body = json!({ "token": token.as_str() });
        self.execute(self.client.delete(&url).json(&body))?;
        Ok(())
    }

    fn signup(&self, username: &str, password: &str, name: &str) -> Result<AuthPayload> {
        let url = self.endpoint(&["signup"]);
        debug!(%url, username, "Signing up");

        let body = json!({ "user": { "username": username, "password": password, "name": name } });
        self.send(self.client.post(&url).json(&body))
    }

    fn login(&self, username: &str, password: &str) -> Result<AuthPayload> {
        let url = self.endpoint(&["login"]);
        debug!(%url, username, "Logging in");

        let body = json!({ "user": { "username": username, "password": password } });
        self.send(self.client.post(&url).json(&body))
    }

    fn fetch_user(&self, username: &str, token: &SessionToken) -> Result<UserPayload> {
        let url = self.endpoint(&["users", username]);
        debug!(%url, "Fetching user");

        let request = self.client.get(&url).query(&[("token", token.as_str())]);
        let envelope: UserEnvelope = self.send(request)?;
        Ok(envelope.user)
    }

    fn add_favorite(
        &self,
        token: &SessionToken,
        username: &str,
        story_id: &StoryId,
    ) -> Result<UserPayload> {
        let url = self.endpoint(&["users", username, "favorites", story_id.as_str()]);
        debug!(%url, "Adding favorite");

        let body = json!({ "token": token.as_str() });
        let envelope: UserEnvelope = self.send(self.client.post(&url).json(&body))?;
        Ok(envelope.user)
    }

    fn remove_favorite(
        &self,
        token: &SessionToken,
        username: &str,
        story_id: &StoryId,
    ) -> Result<UserPayload> {
        let url = self.endpoint(&["users", username, "favorites", story_id.as_str()]);
        debug!(%url, "Removing favorite");

        let body = json!({ "token": token.as_str() });
        let envelope: UserEnvelope = self.send(self.client.delete(&url).json(&body))?;
        Ok(envelope.user)
    }
}
