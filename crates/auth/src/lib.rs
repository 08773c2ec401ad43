//! `enrolguard-auth` — policy-based authorization pipeline.
//!
//! Per request, a layered decision process determines whether an
//! authenticated principal may proceed, checking (in order) in-request
//! claims, a session cache and the remote account facade, with side
//! effects of updating the session, re-issuing claims and redirecting on
//! ambiguous organisation selection.
//!
//! This crate is intentionally decoupled from the host's HTTP framework
//! and session infrastructure: requests arrive as an explicit
//! [`RequestContext`], sessions through the [`SessionStore`] seam, and
//! response side effects leave as data on the [`Evaluation`].

pub mod config;
pub mod constants;
pub mod directory;
pub mod engine;
pub mod models;
pub mod policy;
pub mod principal;
pub mod request;
pub mod resolver;
pub mod session;

pub use config::AuthorizationConfig;
pub use directory::DirectoryClient;
pub use engine::{Decision, Evaluation, PolicyEngine};
pub use models::{Enrolment, Organisation, UserAccount, UserData};
pub use policy::{Exclusion, PolicyRequirement, RoleCheck, policies};
pub use principal::Principal;
pub use request::{ORGANISATION_ID_ROUTE_KEY, RequestContext};
pub use resolver::{AmbiguousOrganisation, resolve_active_organisation};
pub use session::{
    HasUserData, MemorySessionStore, SessionError, SessionHandle, SessionStore, UserSession,
};
