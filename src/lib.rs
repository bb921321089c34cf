//! Client for a Hack-or-Snooze story server: talk to the API, keep the
//! story collections in sync, remember who is logged in.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod session;
pub mod state;
pub mod views;
pub mod worker;

pub use api::{HttpStoryApi, NewStory, StoryApi};
pub use error::{ApiErrorKind, ClientError, Result};
pub use models::{SessionToken, Story, StoryId, StoryList, User};
pub use session::Session;
pub use state::AppState;
