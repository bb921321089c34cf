#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use hack_or_snooze::api::{AuthPayload, NewStory, StoryApi, StoryPayload, UserPayload};
use hack_or_snooze::{ClientError, Result, SessionToken, StoryId};

struct Account {
    password: String,
    name: String,
    created_at: DateTime<Utc>,
    favorites: Vec<StoryId>,
}

#[derive(Default)]
struct ServerState {
    /// Newest first, like the real server
    stories: Vec<StoryPayload>,
    accounts: HashMap<String, Account>,
    /// token -> username
    tokens: HashMap<String, String>,
    next_id: u64,
    offline: bool,
    /// Overrides the username in favorite responses
    favorites_answered_as: Option<String>,
    calls: Vec<String>,
}

/// An in-memory stand-in for the story server with the same rules the real
/// one enforces.
#[derive(Default)]
pub struct FakeServer {
    state: Mutex<ServerState>,
}

fn epoch() -> DateTime<Utc> {
    "2024-01-01T00:00:00Z".parse().unwrap()
}

/// A real `reqwest::Error`, built without touching the network.
pub fn network_error() -> ClientError {
    let err = reqwest::blocking::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    ClientError::Network(err)
}

impl ServerState {
    fn check_online(&mut self, call: &str) -> Result<()> {
        self.calls.push(call.to_string());
        if self.offline {
            return Err(network_error());
        }
        Ok(())
    }

    fn username_for(&self, token: &SessionToken) -> Result<String> {
        self.tokens
            .get(token.as_str())
            .cloned()
            .ok_or_else(|| ClientError::api(401, "Invalid token"))
    }

    fn story(&self, story_id: &StoryId) -> Result<&StoryPayload> {
        self.stories
            .iter()
            .find(|story| &story.story_id == story_id)
            .ok_or_else(|| ClientError::api(404, format!("No story with id {story_id}")))
    }

    fn user_payload(&self, username: &str) -> Result<UserPayload> {
        let account = self
            .accounts
            .get(username)
            .ok_or_else(|| ClientError::api(404, format!("No user {username}")))?;

        let favorites = account
            .favorites
            .iter()
            .filter_map(|id| self.stories.iter().find(|story| &story.story_id == id))
            .cloned()
            .collect();
        let stories = self
            .stories
            .iter()
            .filter(|story| story.username == username)
            .cloned()
            .collect();

        Ok(UserPayload {
            username: username.to_string(),
            name: account.name.clone(),
            created_at: account.created_at,
            favorites,
            stories,
        })
    }

    fn favorites_payload(&self, username: &str) -> Result<UserPayload> {
        let mut payload = self.user_payload(username)?;
        if let Some(other) = &self.favorites_answered_as {
            payload.username = other.clone();
        }
        Ok(payload)
    }

    fn issue_token(&mut self, username: &str) -> SessionToken {
        self.next_id += 1;
        let token = format!("token-{username}-{}", self.next_id);
        self.tokens.insert(token.clone(), username.to_string());
        SessionToken::new(token)
    }

    fn new_story_payload(&mut self, username: &str, story: &NewStory) -> StoryPayload {
        self.next_id += 1;
        StoryPayload {
            story_id: StoryId::from(format!("story-{}", self.next_id)),
            title: story.title.clone(),
            author: story.author.clone(),
            url: story.url.clone(),
            username: username.to_string(),
            created_at: epoch() + Duration::minutes(self.next_id as i64),
        }
    }
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, username: &str, password: &str, name: &str) -> Self {
        self.state.lock().unwrap().accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                name: name.to_string(),
                created_at: epoch(),
                favorites: Vec::new(),
            },
        );
        self
    }

    /// Adds a story straight to the server, behind any client's back.
    pub fn seed_story(&self, title: &str, url: &str, username: &str) -> StoryId {
        let mut state = self.state.lock().unwrap();
        let story = NewStory {
            title: title.to_string(),
            author: "Seeded Author".to_string(),
            url: url.to_string(),
        };
        let payload = state.new_story_payload(username, &story);
        let id = payload.story_id.clone();
        state.stories.insert(0, payload);
        id
    }

    /// Appends a raw payload as-is, duplicates included.
    pub fn push_raw(&self, payload: StoryPayload) {
        self.state.lock().unwrap().stories.push(payload);
    }

    pub fn story_ids(&self) -> Vec<StoryId> {
        let state = self.state.lock().unwrap();
        state.stories.iter().map(|story| story.story_id.clone()).collect()
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn answer_favorites_as(&self, username: &str) {
        self.state.lock().unwrap().favorites_answered_as = Some(username.to_string());
    }

    pub fn revoke_tokens(&self) {
        self.state.lock().unwrap().tokens.clear();
    }

    pub fn issue_token(&self, username: &str) -> SessionToken {
        self.state.lock().unwrap().issue_token(username)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl StoryApi for FakeServer {
    fn fetch_stories(&self) -> Result<Vec<StoryPayload>> {
        let mut state = self.state.lock().unwrap();
        state.check_online("fetch_stories")?;
        Ok(state.stories.clone())
    }

    fn create_story(&self, token: &SessionToken, story: &NewStory) -> Result<StoryPayload> {
        let mut state = self.state.lock().unwrap();
        state.check_online("create_story")?;
        let username = state.username_for(token)?;

        if story.title.is_empty() || story.author.is_empty() || story.url.is_empty() {
            return Err(ClientError::api(400, "title, author and url are required"));
        }

        let payload = state.new_story_payload(&username, story);
        state.stories.insert(0, payload.clone());
        Ok(payload)
    }

    fn delete_story(&self, token: &SessionToken, story_id: &StoryId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.check_online("delete_story")?;
        let username = state.username_for(token)?;

        if state.story(story_id)?.username != username {
            return Err(ClientError::api(403, "Only the submitter can delete a story"));
        }

        state.stories.retain(|story| &story.story_id != story_id);
        for account in state.accounts.values_mut() {
            account.favorites.retain(|id| id != story_id);
        }
        Ok(())
    }

    fn signup(&self, username: &str, password: &str, name: &str) -> Result<AuthPayload> {
        let mut state = self.state.lock().unwrap();
        state.check_online("signup")?;

        if state.accounts.contains_key(username) {
            return Err(ClientError::api(409, format!("Username {username} already taken")));
        }

        state.accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                name: name.to_string(),
                created_at: epoch(),
                favorites: Vec::new(),
            },
        );
        let token = state.issue_token(username);
        Ok(AuthPayload {
            token,
            user: state.user_payload(username)?,
        })
    }

    fn login(&self, username: &str, password: &str) -> Result<AuthPayload> {
        let mut state = self.state.lock().unwrap();
        state.check_online("login")?;

        let valid = state
            .accounts
            .get(username)
            .is_some_and(|account| account.password == password);
        if !valid {
            return Err(ClientError::api(401, "Invalid username or password"));
        }

        let token = state.issue_token(username);
        Ok(AuthPayload {
            token,
            user: state.user_payload(username)?,
        })
    }

    fn fetch_user(&self, username: &str, token: &SessionToken) -> Result<UserPayload> {
        let mut state = self.state.lock().unwrap();
        state.check_online("fetch_user")?;

        if state.username_for(token)? != username {
            return Err(ClientError::api(401, "Token does not match user"));
        }
        state.user_payload(username)
    }

    fn add_favorite(
        &self,
        token: &SessionToken,
        username: &str,
        story_id: &StoryId,
    ) -> Result<UserPayload> {
        let mut state = self.state.lock().unwrap();
        state.check_online("add_favorite")?;

        if state.username_for(token)? != username {
            return Err(ClientError::api(401, "Token does not match user"));
        }
        state.story(story_id)?;

        if let Some(account) = state.accounts.get_mut(username) {
            if !account.favorites.contains(story_id) {
                account.favorites.push(story_id.clone());
            }
        }
        state.favorites_payload(username)
    }

    fn remove_favorite(
        &self,
        token: &SessionToken,
        username: &str,
        story_id: &StoryId,
    ) -> Result<UserPayload> {
        let mut state = self.state.lock().unwrap();
        state.check_online("remove_favorite")?;

        if state.username_for(token)? != username {
            return Err(ClientError::api(401, "Token does not match user"));
        }

        if let Some(account) = state.accounts.get_mut(username) {
            account.favorites.retain(|id| id != story_id);
        }
        state.favorites_payload(username)
    }
}

pub fn new_story(title: &str, url: &str) -> NewStory {
    NewStory {
        title: title.to_string(),
        author: "Test Author".to_string(),
        url: url.to_string(),
    }
}
