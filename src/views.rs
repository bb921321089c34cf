//! What each screen should show, derived from [`AppState`].
//!
//! These are plain values; the UI reads them after every applied change and
//! draws whatever they say.

use chrono::{DateTime, Utc};

use crate::models::{Story, StoryId, User};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    AllStories,
    Favorites,
    OwnStories,
}

/// One line in a story listing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryRow {
    pub id: StoryId,
    pub title: String,
    pub url: String,
    pub host_name: Option<String>,
    pub author: String,
    pub posted_by: String,
    /// `None` when nobody is logged in, so no star is drawn
    pub favorite: Option<bool>,
    pub deletable: bool,
}

impl StoryRow {
    fn new(story: &Story, user: Option<&User>, deletable: bool) -> Self {
        Self {
            id: story.id.clone(),
            title: story.title.clone(),
            url: story.url.clone(),
            host_name: story.host_name.clone(),
            author: story.author.clone(),
            posted_by: story.username.clone(),
            favorite: user.map(|user| user.is_favorite(&story.id)),
            deletable,
        }
    }

    pub fn host_label(&self) -> String {
        match &self.host_name {
            Some(host) => format!("({host})"),
            None => "(unknown host)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl ProfileView {
    pub fn created_label(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavView {
    pub logged_in_as: Option<String>,
    /// Submit, Favorites and My stories only make sense when logged in
    pub show_user_links: bool,
}

pub fn all_stories(state: &AppState) -> Vec<StoryRow> {
    let user = state.session.user();
    state
        .stories
        .stories()
        .iter()
        .map(|story| StoryRow::new(story, user, false))
        .collect()
}

pub fn favorite_stories(state: &AppState) -> Vec<StoryRow> {
    let Some(user) = state.session.user() else {
        return Vec::new();
    };
    user.favorites()
        .iter()
        .map(|story| StoryRow::new(story, Some(user), false))
        .collect()
}

pub fn own_stories(state: &AppState) -> Vec<StoryRow> {
    let Some(user) = state.session.user() else {
        return Vec::new();
    };
    user.own_stories()
        .iter()
        .map(|story| StoryRow::new(story, Some(user), true))
        .collect()
}

pub fn listing(state: &AppState, listing: Listing) -> Vec<StoryRow> {
    match listing {
        Listing::AllStories => all_stories(state),
        Listing::Favorites => favorite_stories(state),
        Listing::OwnStories => own_stories(state),
    }
}

pub fn profile(state: &AppState) -> Option<ProfileView> {
    state.session.user().map(|user| ProfileView {
        name: user.name.clone(),
        username: user.username.clone(),
        created_at: user.created_at,
    })
}

pub fn nav(state: &AppState) -> NavView {
    let logged_in_as = state.session.user().map(|user| user.username.clone());
    NavView {
        show_user_links: logged_in_as.is_some(),
        logged_in_as,
    }
}
