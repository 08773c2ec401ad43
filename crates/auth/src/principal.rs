//! The request's security principal and its user-data claim.
//!
//! `UserData` is cached on the principal as one opaque serialized claim
//! value. Refreshing the claim marks the principal for re-issue; the host
//! re-signs the auth cookie from the updated principal, preserving its
//! existing authentication properties.

use serde_json::Error as JsonError;
use uuid::Uuid;

use crate::models::UserData;

/// Authenticated-or-not identity attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    user_id: Option<Uuid>,
    authenticated: bool,
    user_data_claim: Option<String>,
}

impl Principal {
    /// A principal with no authenticated identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated principal identified by `user_id`.
    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            authenticated: true,
            user_data_claim: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// The raw serialized user-data claim, if any.
    pub fn user_data_claim(&self) -> Option<&str> {
        self.user_data_claim.as_deref()
    }

    /// Deserialize the user-data claim. A missing or malformed claim reads
    /// as absent; malformed data is a deny signal, not an error.
    pub fn user_data(&self) -> Option<UserData> {
        let claim = self.user_data_claim.as_deref()?;
        serde_json::from_str(claim).ok()
    }

    /// Replace the user-data claim with a fresh snapshot.
    pub fn set_user_data(&mut self, user_data: &UserData) -> Result<(), JsonError> {
        self.user_data_claim = Some(serde_json::to_string(user_data)?);
        Ok(())
    }

    /// Attach a pre-serialized user-data claim (e.g. from an auth cookie).
    pub fn with_user_data_claim(mut self, claim: impl Into<String>) -> Self {
        self.user_data_claim = Some(claim.into());
        self
    }
}
