//! Runs server calls off the UI thread.
//!
//! A [`Job`] carries everything its request needs, captured when the user
//! acted. The worker thread performs only the network half and sends the
//! raw result back as an [`Outcome`]; `AppState::apply` does the rest.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::api::{AuthPayload, NewStory, StoryApi, StoryPayload, UserPayload};
use crate::db::StoredCredentials;
use crate::error::Result;
use crate::models::{SessionToken, StoryId};
use crate::session::FavoriteRequest;

// No Debug: Signup and Login carry a password
#[derive(Clone)]
pub enum Job {
    LoadStories,
    Restore(StoredCredentials),
    Signup {
        username: String,
        password: String,
        name: String,
    },
    Login {
        username: String,
        password: String,
    },
    SubmitStory {
        token: SessionToken,
        username: String,
        story: NewStory,
    },
    DeleteStory {
        token: SessionToken,
        username: String,
        story_id: StoryId,
    },
    ToggleFavorite(FavoriteRequest),
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::LoadStories => "load-stories",
            Job::Restore(_) => "restore",
            Job::Signup { .. } => "signup",
            Job::Login { .. } => "login",
            Job::SubmitStory { .. } => "submit-story",
            Job::DeleteStory { .. } => "delete-story",
            Job::ToggleFavorite(_) => "toggle-favorite",
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    StoriesLoaded(Result<Vec<StoryPayload>>),
    Restored {
        credentials: StoredCredentials,
        result: Result<UserPayload>,
    },
    SignedIn(Result<AuthPayload>),
    StorySubmitted {
        username: String,
        result: Result<StoryPayload>,
    },
    StoryDeleted {
        username: String,
        story_id: StoryId,
        result: Result<()>,
    },
    FavoriteToggled {
        request: FavoriteRequest,
        result: Result<UserPayload>,
    },
}

/// Performs the server call for `job` on the current thread.
pub fn run_job(api: &dyn StoryApi, job: Job) -> Outcome {
    debug!(job = job.name(), "Running job");

    match job {
        Job::LoadStories => Outcome::StoriesLoaded(api.fetch_stories()),
        Job::Restore(credentials) => {
            let result = api.fetch_user(&credentials.username, &credentials.token);
            Outcome::Restored {
                credentials,
                result,
            }
        }
        Job::Signup {
            username,
            password,
            name,
        } => Outcome::SignedIn(api.signup(&username, &password, &name)),
        Job::Login { username, password } => Outcome::SignedIn(api.login(&username, &password)),
        Job::SubmitStory {
            token,
            username,
            story,
        } => Outcome::StorySubmitted {
            username,
            result: api.create_story(&token, &story),
        },
        Job::DeleteStory {
            token,
            username,
            story_id,
        } => {
            let result = api.delete_story(&token, &story_id);
            Outcome::StoryDeleted {
                username,
                story_id,
                result,
            }
        }
        Job::ToggleFavorite(request) => {
            let result = request.send(api);
            Outcome::FavoriteToggled { request, result }
        }
    }
}

/// Runs `job` on a new thread and sends its outcome to `tx`. Jobs cannot be
/// cancelled; if nobody is listening any more the outcome is dropped.
pub fn spawn_job(api: Arc<dyn StoryApi>, job: Job, tx: Sender<Outcome>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let outcome = run_job(api.as_ref(), job);
        if tx.send(outcome).is_err() {
            debug!("Outcome receiver gone, dropping result");
        }
    })
}
