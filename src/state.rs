use tracing::{debug, warn};

use crate::api::{NewStory, StoryApi};
use crate::db::{CredentialStore, StoredCredentials};
use crate::error::Result;
use crate::models::{Story, StoryId, StoryList};
use crate::session::{FavoriteAction, Session};
use crate::worker::{Job, Outcome};

/// Everything the client knows: all stories plus who is logged in.
///
/// Owned by a single place (the UI thread) and only changed after the
/// server call it depends on has completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub stories: StoryList,
    pub session: Session,
    /// Set while a `Job::Restore` is out; any login or logout clears it
    pub(crate) restore_pending: bool,
}

fn remember(session: &Session, store: &dyn CredentialStore) {
    if let Some(credentials) = session.credentials() {
        if let Err(e) = credentials.save(store) {
            warn!(error = %e, "Could not remember credentials");
        }
    }
}

fn forget(store: &dyn CredentialStore) {
    if let Err(e) = StoredCredentials::clear(store) {
        warn!(error = %e, "Could not clear stored credentials");
    }
}

fn stored_credentials(store: &dyn CredentialStore) -> Option<StoredCredentials> {
    match StoredCredentials::load(store) {
        Ok(credentials) => credentials,
        Err(e) => {
            warn!(error = %e, "Could not read stored credentials");
            None
        }
    }
}

impl AppState {
    /// Starts from whatever credentials are stored. A stale or unreadable
    /// credential yields an anonymous state and is removed from the store.
    pub fn restore(api: &dyn StoryApi, store: &dyn CredentialStore) -> Self {
        let mut state = Self::default();

        if let Some(credentials) = stored_credentials(store) {
            if !state.session.restore(api, &credentials) {
                forget(store);
            }
        }

        state
    }

    /// A background restore for whatever credentials are stored, if any.
    pub fn restore_job(&mut self, store: &dyn CredentialStore) -> Option<Job> {
        let Some(credentials) = stored_credentials(store) else {
            debug!("No stored credentials");
            return None;
        };
        self.restore_pending = true;
        Some(Job::Restore(credentials))
    }

    pub fn is_restoring(&self) -> bool {
        self.restore_pending
    }

    pub fn reload_stories(&mut self, api: &dyn StoryApi) -> Result<()> {
        self.stories = StoryList::load(api)?;
        Ok(())
    }

    pub fn signup(
        &mut self,
        api: &dyn StoryApi,
        store: &dyn CredentialStore,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<()> {
        self.session.signup(api, username, password, name)?;
        self.restore_pending = false;
        remember(&self.session, store);
        Ok(())
    }

    pub fn login(
        &mut self,
        api: &dyn StoryApi,
        store: &dyn CredentialStore,
        username: &str,
        password: &str,
    ) -> Result<()> {
        self.session.login(api, username, password)?;
        self.restore_pending = false;
        remember(&self.session, store);
        Ok(())
    }

    pub fn logout(&mut self, store: &dyn CredentialStore) -> Result<()> {
        self.session.logout();
        self.restore_pending = false;
        StoredCredentials::clear(store)
    }

    pub fn submit_story(&mut self, api: &dyn StoryApi, new_story: &NewStory) -> Result<Story> {
        let user = self.session.require_user_mut()?;
        self.stories.add_story(api, user, new_story)
    }

    pub fn delete_story(&mut self, api: &dyn StoryApi, story_id: &StoryId) -> Result<()> {
        let user = self.session.require_user_mut()?;
        self.stories.delete_story(api, user, story_id)
    }

    pub fn toggle_favorite(
        &mut self,
        api: &dyn StoryApi,
        story_id: &StoryId,
    ) -> Result<FavoriteAction> {
        self.session.toggle_favorite(api, story_id)
    }

    pub fn submit_story_job(&self, story: NewStory) -> Result<Job> {
        let user = self.session.require_user()?;
        Ok(Job::SubmitStory {
            token: user.token.clone(),
            username: user.username.clone(),
            story,
        })
    }

    pub fn delete_story_job(&self, story_id: StoryId) -> Result<Job> {
        let user = self.session.require_user()?;
        Ok(Job::DeleteStory {
            token: user.token.clone(),
            username: user.username.clone(),
            story_id,
        })
    }

    pub fn toggle_favorite_job(&self, story_id: &StoryId) -> Result<Job> {
        Ok(Job::ToggleFavorite(self.session.favorite_request(story_id)?))
    }

    /// Folds the result of a background job into the state. Errors from the
    /// server come back out for the UI to show; restore failures do not.
    pub fn apply(&mut self, outcome: Outcome, store: &dyn CredentialStore) -> Result<()> {
        match outcome {
            Outcome::StoriesLoaded(result) => {
                self.stories = StoryList::from_payloads(result?);
                debug!(count = self.stories.len(), "Loaded stories");
            }
            Outcome::Restored {
                credentials,
                result,
            } => {
                // A login or logout since dispatch wins over the stored credentials
                if !self.restore_pending {
                    debug!("Session changed since restore started, ignoring it");
                    return Ok(());
                }
                self.restore_pending = false;

                if !self.session.accept_restore(&credentials, result) {
                    forget(store);
                }
            }
            Outcome::SignedIn(result) => {
                self.session.sign_in(result?);
                self.restore_pending = false;
                remember(&self.session, store);
            }
            Outcome::StorySubmitted { username, result } => {
                let story = Story::from(result?);
                self.stories.insert(story.clone());
                match self.session.user_mut() {
                    Some(user) if user.username == username => user.record_own_story(story),
                    _ => debug!(id = %story.id, "Submitter no longer logged in"),
                }
            }
            Outcome::StoryDeleted {
                username,
                story_id,
                result,
            } => {
                result?;
                self.stories.remove(&story_id);
                if let Some(user) = self.session.user_mut() {
                    if user.username == username {
                        user.forget_own_story(&story_id);
                    }
                }
            }
            Outcome::FavoriteToggled { request, result } => {
                self.session.accept_user_payload(&request, result?);
            }
        }

        Ok(())
    }
}
