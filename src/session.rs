//! Session lifecycle: the bearer token and agency id live in local storage
//! between invocations and travel as an explicit [`Session`] value into every
//! API call.

use std::fmt;
use tracing::{debug, info};

use crate::error::{ApiError, StorageError};
use crate::model::{LoginResponse, PersonalInfo};
use crate::route::Route;
use crate::storage::{self, Pool, KEY_AGENCY_ID, KEY_PERSONAL_INFO, KEY_TOKEN};

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    agency_id: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.token.is_some())
            .field("agency_id", &self.agency_id)
            .finish()
    }
}

impl Session {
    pub fn new(token: impl Into<String>, agency_id: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            agency_id: Some(agency_id.into()),
        }
    }

    /// Session with no credentials; only login and registration work with it.
    pub fn anonymous() -> Self {
        Self::default()
    }

    fn from_parts(token: Option<String>, agency_id: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            agency_id: agency_id.filter(|a| !a.is_empty()),
        }
    }

    pub fn token(&self) -> Result<&str, ApiError> {
        self.token.as_deref().ok_or(ApiError::NotAuthenticated)
    }

    pub fn agency_id(&self) -> Result<&str, ApiError> {
        self.agency_id.as_deref().ok_or(ApiError::MissingAgency)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Owns the persisted half of the session.
#[derive(Clone)]
pub struct SessionStore {
    pool: Pool,
}

impl SessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn load(&self) -> Result<Session, StorageError> {
        let token = storage::get_item(&self.pool, KEY_TOKEN).await?;
        let agency_id = storage::get_item(&self.pool, KEY_AGENCY_ID).await?;
        Ok(Session::from_parts(token, agency_id))
    }

    /// Persist a successful login and hand back the live session.
    pub async fn begin(&self, login: &LoginResponse) -> Result<Session, StorageError> {
        storage::set_item(&self.pool, KEY_TOKEN, &login.access_token).await?;
        storage::set_item(&self.pool, KEY_AGENCY_ID, &login.agency_id).await?;
        info!(agency_id = %login.agency_id, "session started");
        Ok(Session::new(login.access_token.clone(), login.agency_id.clone()))
    }

    pub async fn end(&self) -> Result<(), StorageError> {
        storage::remove_item(&self.pool, KEY_TOKEN).await?;
        storage::remove_item(&self.pool, KEY_AGENCY_ID).await?;
        info!("session ended");
        Ok(())
    }

    /// Registration stores the new agency id before the admin logs in.
    pub async fn remember_agency(&self, agency_id: &str) -> Result<(), StorageError> {
        storage::set_item(&self.pool, KEY_AGENCY_ID, agency_id).await
    }

    pub async fn save_draft(&self, info: &PersonalInfo) -> Result<(), StorageError> {
        let raw = serde_json::to_string(info)?;
        storage::set_item(&self.pool, KEY_PERSONAL_INFO, &raw).await
    }

    pub async fn load_draft(&self) -> Result<Option<PersonalInfo>, StorageError> {
        match storage::get_item(&self.pool, KEY_PERSONAL_INFO).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn clear_draft(&self) -> Result<(), StorageError> {
        storage::remove_item(&self.pool, KEY_PERSONAL_INFO).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unauthenticated,
    Checking,
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Render(Session),
    Redirect(Route),
}

/// Gates dashboard commands on the presence of a token. The token is not
/// validated; the backend rejects stale ones.
#[derive(Debug)]
pub struct SessionGuard {
    state: GuardState,
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Unauthenticated,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub async fn check(&mut self, store: &SessionStore) -> Result<GuardOutcome, StorageError> {
        self.state = GuardState::Checking;
        match store.load().await {
            Ok(session) => Ok(self.resolve(session)),
            Err(err) => {
                self.state = GuardState::Unauthenticated;
                Err(err)
            }
        }
    }

    pub fn resolve(&mut self, session: Session) -> GuardOutcome {
        if session.is_authenticated() {
            self.state = GuardState::Authenticated;
            GuardOutcome::Render(session)
        } else {
            debug!("no token stored, redirecting to login");
            self.state = GuardState::Unauthenticated;
            GuardOutcome::Redirect(Route::Login)
        }
    }
}
