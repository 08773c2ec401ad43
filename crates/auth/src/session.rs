//! Session store adapter.
//!
//! Sessions cache `UserData` between requests and remember the selected
//! organisation. This subsystem creates and updates sessions but never
//! deletes them; lifecycle belongs to the host's session infrastructure.
//! The store is expected to provide per-session-key consistency.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::UserData;

/// Opaque key identifying one user's session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHandle(String);

impl SessionHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionHandle {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session backend unavailable: {0}")]
    Backend(String),

    #[error("session payload could not be decoded: {0}")]
    Codec(String),
}

/// Contract for session records the authorization pipeline can work with.
///
/// `selected_organisation_id` defaults to absent so session types that do
/// not track an organisation selection satisfy the contract unchanged.
pub trait HasUserData {
    fn user_data(&self) -> Option<&UserData>;

    fn set_user_data(&mut self, user_data: UserData);

    fn selected_organisation_id(&self) -> Option<Uuid> {
        None
    }

    fn set_selected_organisation_id(&mut self, _id: Uuid) {}
}

/// Get/save of a per-user session object keyed by an opaque handle.
#[async_trait]
pub trait SessionStore: Send + Sync {
    type Session: HasUserData + Default + Send + Sync;

    async fn load(&self, handle: &SessionHandle) -> Result<Option<Self::Session>, SessionError>;

    async fn save(&self, handle: &SessionHandle, session: &Self::Session)
    -> Result<(), SessionError>;
}

#[async_trait]
impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    type Session = S::Session;

    async fn load(&self, handle: &SessionHandle) -> Result<Option<Self::Session>, SessionError> {
        (**self).load(handle).await
    }

    async fn save(
        &self,
        handle: &SessionHandle,
        session: &Self::Session,
    ) -> Result<(), SessionError> {
        (**self).save(handle, session).await
    }
}

/// Canonical session record for hosts without a bespoke session type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSession {
    pub user_data: Option<UserData>,
    pub selected_organisation_id: Option<Uuid>,
}

impl HasUserData for UserSession {
    fn user_data(&self) -> Option<&UserData> {
        self.user_data.as_ref()
    }

    fn set_user_data(&mut self, user_data: UserData) {
        self.user_data = Some(user_data);
    }

    fn selected_organisation_id(&self) -> Option<Uuid> {
        self.selected_organisation_id
    }

    fn set_selected_organisation_id(&mut self, id: Uuid) {
        self.selected_organisation_id = Some(id);
    }
}

/// In-memory session store.
///
/// Intended for tests/dev. Not optimized for performance.
pub struct MemorySessionStore<T> {
    sessions: RwLock<HashMap<SessionHandle, T>>,
}

impl<T> MemorySessionStore<T> {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for MemorySessionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> SessionStore for MemorySessionStore<T>
where
    T: HasUserData + Default + Clone + Send + Sync,
{
    type Session = T;

    async fn load(&self, handle: &SessionHandle) -> Result<Option<T>, SessionError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::Backend("session store lock poisoned".to_string()))?;
        Ok(sessions.get(handle).cloned())
    }

    async fn save(&self, handle: &SessionHandle, session: &T) -> Result<(), SessionError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::Backend("session store lock poisoned".to_string()))?;
        sessions.insert(handle.clone(), session.clone());
        Ok(())
    }
}
