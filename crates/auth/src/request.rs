//! Explicit per-request context.
//!
//! Everything the pipeline needs from the current request is passed in
//! explicitly; there is no ambient "current request" accessor.

use std::collections::HashMap;

use crate::session::SessionHandle;

/// Route parameter carrying the organisation selected by the URL.
pub const ORGANISATION_ID_ROUTE_KEY: &str = "organisationId";

/// Snapshot of the current request as seen by the authorization pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    path: String,
    route_values: HashMap<String, String>,
    session: Option<SessionHandle>,
    allows_anonymous: bool,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Attach the caller's session handle. Requests without one can still
    /// pass the claim tier but deny once cached data is needed.
    pub fn with_session(mut self, session: impl Into<SessionHandle>) -> Self {
        self.session = Some(session.into());
        self
    }

    pub fn with_route_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_values.insert(key.into(), value.into());
        self
    }

    /// Mark the matched endpoint as anonymous-allowed.
    pub fn allowing_anonymous(mut self) -> Self {
        self.allows_anonymous = true;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn route_value(&self, key: &str) -> Option<&str> {
        self.route_values.get(key).map(String::as_str)
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    pub fn allows_anonymous(&self) -> bool {
        self.allows_anonymous
    }
}
