use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::api::{NewStory, StoryApi, StoryPayload, UserPayload};
use crate::error::Result;

/// Server-assigned story identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(String);

impl StoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StoryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for StoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque login token issued at signup/login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub author: String,
    pub url: String,
    /// Who submitted it
    pub username: String,
    pub created_at: DateTime<Utc>,
    /// Derived from `url`; `None` when the url does not parse or has no host
    pub host_name: Option<String>,
}

impl From<StoryPayload> for Story {
    fn from(payload: StoryPayload) -> Self {
        let host_name = host_name(&payload.url);
        Self {
            id: payload.story_id,
            title: payload.title,
            author: payload.author,
            url: payload.url,
            username: payload.username,
            created_at: payload.created_at,
            host_name,
        }
    }
}

/// Host part of `url` without a leading `www.`.
pub fn host_name(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(url, error = %e, "Story url did not parse");
            return None;
        }
    };

    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Drops stories whose id was already seen, keeping the first occurrence.
fn dedup_by_id(stories: impl IntoIterator<Item = Story>) -> Vec<Story> {
    let mut seen = HashSet::new();
    stories
        .into_iter()
        .filter(|story| {
            let fresh = seen.insert(story.id.clone());
            if !fresh {
                warn!(id = %story.id, "Dropping duplicate story");
            }
            fresh
        })
        .collect()
}

/// Every story known to the client, in server order (newest first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryList {
    stories: Vec<Story>,
}

impl StoryList {
    pub fn from_payloads(payloads: Vec<StoryPayload>) -> Self {
        Self {
            stories: dedup_by_id(payloads.into_iter().map(Story::from)),
        }
    }

    /// Fetches the current stories from the server. Nothing is cached.
    pub fn load(api: &dyn StoryApi) -> Result<Self> {
        let list = Self::from_payloads(api.fetch_stories()?);
        debug!(count = list.len(), "Loaded stories");
        Ok(list)
    }

    /// Submits a story as `user` and records it in both this list and the
    /// user's own stories. Nothing changes if the server refuses it.
    pub fn add_story(
        &mut self,
        api: &dyn StoryApi,
        user: &mut User,
        new_story: &NewStory,
    ) -> Result<Story> {
        let story = Story::from(api.create_story(&user.token, new_story)?);

        self.insert(story.clone());
        user.record_own_story(story.clone());
        Ok(story)
    }

    /// Deletes a story on the server, then filters it out of both this list
    /// and the user's own stories.
    pub fn delete_story(
        &mut self,
        api: &dyn StoryApi,
        user: &mut User,
        story_id: &StoryId,
    ) -> Result<()> {
        api.delete_story(&user.token, story_id)?;

        self.remove(story_id);
        user.forget_own_story(story_id);
        Ok(())
    }

    /// Appends `story` unless its id is already present.
    pub fn insert(&mut self, story: Story) {
        if self.contains(&story.id) {
            warn!(id = %story.id, "Story already listed");
            return;
        }
        self.stories.push(story);
    }

    pub fn remove(&mut self, story_id: &StoryId) {
        self.stories.retain(|story| &story.id != story_id);
    }

    pub fn contains(&self, story_id: &StoryId) -> bool {
        self.stories.iter().any(|story| &story.id == story_id)
    }

    pub fn get(&self, story_id: &StoryId) -> Option<&Story> {
        self.stories.iter().find(|story| &story.id == story_id)
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

/// The logged in user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    favorites: Vec<Story>,
    own_stories: Vec<Story>,
    pub token: SessionToken,
}

impl User {
    /// The one place a server user turns into a domain user. The server's
    /// `stories` become `own_stories`.
    pub fn from_payload(payload: UserPayload, token: SessionToken) -> Self {
        Self {
            username: payload.username,
            name: payload.name,
            created_at: payload.created_at,
            favorites: dedup_by_id(payload.favorites.into_iter().map(Story::from)),
            own_stories: dedup_by_id(payload.stories.into_iter().map(Story::from)),
            token,
        }
    }

    pub fn favorites(&self) -> &[Story] {
        &self.favorites
    }

    pub fn own_stories(&self) -> &[Story] {
        &self.own_stories
    }

    pub fn is_favorite(&self, story_id: &StoryId) -> bool {
        self.favorites.iter().any(|story| &story.id == story_id)
    }

    pub fn owns(&self, story_id: &StoryId) -> bool {
        self.own_stories.iter().any(|story| &story.id == story_id)
    }

    pub fn favorite_ids(&self) -> HashSet<StoryId> {
        self.favorites.iter().map(|story| story.id.clone()).collect()
    }

    pub fn record_own_story(&mut self, story: Story) {
        if !self.owns(&story.id) {
            self.own_stories.push(story);
        }
    }

    pub fn forget_own_story(&mut self, story_id: &StoryId) {
        self.own_stories.retain(|story| &story.id != story_id);
    }
}
