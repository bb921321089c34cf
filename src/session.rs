//! Who is logged in.
//!
//! A [`Session`] is either anonymous or holds the one current [`User`].
//! Every transition happens only after the server call it depends on has
//! returned, so a failed call leaves the session exactly as it was.

use tracing::{debug, info, warn};

use crate::api::{AuthPayload, StoryApi, UserPayload};
use crate::db::StoredCredentials;
use crate::error::{ClientError, Result};
use crate::models::{SessionToken, StoryId, User};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(User),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteAction {
    Add,
    Remove,
}

/// A favorite toggle, decided from the session as it was when issued.
#[derive(Debug, Clone)]
pub struct FavoriteRequest {
    pub token: SessionToken,
    pub username: String,
    pub story_id: StoryId,
    pub action: FavoriteAction,
}

impl FavoriteRequest {
    pub fn send(&self, api: &dyn StoryApi) -> Result<UserPayload> {
        match self.action {
            FavoriteAction::Add => api.add_favorite(&self.token, &self.username, &self.story_id),
            FavoriteAction::Remove => {
                api.remove_favorite(&self.token, &self.username, &self.story_id)
            }
        }
    }
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    pub fn user_mut(&mut self) -> Option<&mut User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    pub fn require_user(&self) -> Result<&User> {
        self.user().ok_or(ClientError::NotLoggedIn)
    }

    pub fn require_user_mut(&mut self) -> Result<&mut User> {
        self.user_mut().ok_or(ClientError::NotLoggedIn)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Credentials worth remembering for the next run.
    pub fn credentials(&self) -> Option<StoredCredentials> {
        self.user().map(|user| StoredCredentials {
            token: user.token.clone(),
            username: user.username.clone(),
        })
    }

    /// Becomes the user a signup or login returned.
    pub fn sign_in(&mut self, auth: AuthPayload) {
        let user = User::from_payload(auth.user, auth.token);
        info!(username = %user.username, "Logged in");
        *self = Self::Authenticated(user);
    }

    pub fn signup(
        &mut self,
        api: &dyn StoryApi,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<()> {
        let auth = api.signup(username, password, name)?;
        self.sign_in(auth);
        Ok(())
    }

    pub fn login(&mut self, api: &dyn StoryApi, username: &str, password: &str) -> Result<()> {
        let auth = api.login(username, password)?;
        self.sign_in(auth);
        Ok(())
    }

    /// Tries to pick up where a previous run left off. Any failure leaves
    /// the session anonymous; nothing is returned but whether it worked.
    pub fn restore(&mut self, api: &dyn StoryApi, credentials: &StoredCredentials) -> bool {
        let result = api.fetch_user(&credentials.username, &credentials.token);
        self.accept_restore(credentials, result)
    }

    pub fn accept_restore(
        &mut self,
        credentials: &StoredCredentials,
        result: Result<UserPayload>,
    ) -> bool {
        match result {
            Ok(payload) => {
                let user = User::from_payload(payload, credentials.token.clone());
                info!(username = %user.username, "Restored session");
                *self = Self::Authenticated(user);
                true
            }
            Err(e) => {
                warn!(username = %credentials.username, error = %e, "Could not restore session");
                *self = Self::Anonymous;
                false
            }
        }
    }

    pub fn logout(&mut self) {
        if let Self::Authenticated(user) = self {
            info!(username = %user.username, "Logged out");
        }
        *self = Self::Anonymous;
    }

    /// Works out whether toggling `story_id` means adding or removing it.
    pub fn favorite_request(&self, story_id: &StoryId) -> Result<FavoriteRequest> {
        let user = self.require_user()?;
        let action = if user.is_favorite(story_id) {
            FavoriteAction::Remove
        } else {
            FavoriteAction::Add
        };

        Ok(FavoriteRequest {
            token: user.token.clone(),
            username: user.username.clone(),
            story_id: story_id.clone(),
            action,
        })
    }

    /// Replaces the current user with the server's view of them. Responses
    /// for someone who is no longer logged in are discarded.
    pub fn accept_user_payload(&mut self, request: &FavoriteRequest, payload: UserPayload) -> bool {
        let Self::Authenticated(user) = self else {
            debug!(story_id = %request.story_id, "Ignoring favorite response after logout");
            return false;
        };

        if user.username != request.username || payload.username != request.username {
            debug!(story_id = %request.story_id, "Ignoring favorite response for another user");
            return false;
        }

        let token = user.token.clone();
        *user = User::from_payload(payload, token);
        true
    }

    /// Adds `story_id` to the favorites if absent, removes it otherwise, and
    /// rebuilds the user from the server's answer.
    pub fn toggle_favorite(&mut self, api: &dyn StoryApi, story_id: &StoryId) -> Result<FavoriteAction> {
        let request = self.favorite_request(story_id)?;
        let payload = request.send(api)?;

        let actual = payload.username.clone();
        if !self.accept_user_payload(&request, payload) {
            warn!(%story_id, expected = %request.username, %actual, "Favorite response dropped");
            return Err(ClientError::UnexpectedUser {
                expected: request.username,
                actual,
            });
        }
        debug!(%story_id, action = ?request.action, "Toggled favorite");
        Ok(request.action)
    }
}
