//! Policy decision engine.
//!
//! Decisions escalate through three tiers in a fixed order (claim, then
//! session cache, then remote directory), short-circuiting on the first
//! grant. Tier data flows one way: a remote fetch updates the session and
//! the principal's claims, a session hit refreshes the claims, and a
//! claim hit touches nothing.
//!
//! The engine never returns an error: every internal failure is logged and
//! resolved to a deny.

use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::AuthorizationConfig;
use crate::directory::DirectoryClient;
use crate::models::UserData;
use crate::policy::{PolicyRequirement, RoleCheck};
use crate::principal::Principal;
use crate::request::{ORGANISATION_ID_ROUTE_KEY, RequestContext};
use crate::resolver::resolve_active_organisation;
use crate::session::{HasUserData, SessionError, SessionHandle, SessionStore};

/// Outcome of one requirement evaluation.
///
/// `Skipped` means the request matched one of the policy's endpoint
/// exclusions and was not evaluated; host enforcement should not block it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Granted,
    Denied,
    Skipped,
}

/// A decision plus the side effects the host must apply to the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,

    /// Redirect to issue, if any. Later redirects overwrite earlier ones.
    pub redirect: Option<String>,

    /// Whether the principal's claims were refreshed; the host re-issues
    /// the auth cookie from the updated principal, preserving its existing
    /// authentication properties.
    pub principal_refreshed: bool,
}

impl Evaluation {
    fn skipped() -> Self {
        Self {
            decision: Decision::Skipped,
            redirect: None,
            principal_refreshed: false,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.decision == Decision::Granted
    }
}

#[derive(Debug, Default)]
struct Effects {
    redirect: Option<String>,
    principal_refreshed: bool,
}

#[derive(Debug, Error)]
enum EngineError {
    #[error("request carries no session handle; session support is not configured")]
    MissingSession,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("user data claim could not be serialized: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Session state loaded at most once per evaluation and shared between the
/// cache tier and the role predicates.
struct LazySession<'a, S: SessionStore> {
    store: &'a S,
    handle: Option<&'a SessionHandle>,
    state: Option<S::Session>,
}

impl<'a, S: SessionStore> LazySession<'a, S> {
    fn new(store: &'a S, request: &'a RequestContext) -> Self {
        Self {
            store,
            handle: request.session(),
            state: None,
        }
    }

    async fn get(&mut self) -> Result<&mut S::Session, EngineError> {
        if self.state.is_none() {
            let handle = self.handle.ok_or(EngineError::MissingSession)?;
            let loaded = self.store.load(handle).await?.unwrap_or_default();
            self.state = Some(loaded);
        }
        Ok(self.state.get_or_insert_with(S::Session::default))
    }

    async fn save(&mut self) -> Result<(), EngineError> {
        let handle = self.handle.ok_or(EngineError::MissingSession)?;
        if let Some(state) = &self.state {
            self.store.save(handle, state).await?;
        }
        Ok(())
    }
}

/// The three-tier authorization decision engine.
pub struct PolicyEngine<S: SessionStore> {
    sessions: S,
    directory: DirectoryClient,
    config: AuthorizationConfig,
    service_key: String,
}

impl<S: SessionStore> PolicyEngine<S> {
    pub fn new(config: AuthorizationConfig, sessions: S) -> Self {
        let directory = DirectoryClient::new(config.facade_base_url.clone());
        let service_key = config.service_key.clone();
        Self {
            sessions,
            directory,
            config,
            service_key,
        }
    }

    /// Override the service identity used for endpoint selection.
    pub fn with_service_key(mut self, service_key: impl Into<String>) -> Self {
        self.service_key = service_key.into();
        self
    }

    /// Use a caller-built directory client (shared pool, custom timeouts).
    pub fn with_directory_client(mut self, directory: DirectoryClient) -> Self {
        self.directory = directory;
        self
    }

    /// Evaluate `requirement` for the request's principal.
    ///
    /// Re-evaluating the same requirement for the same request is safe and
    /// yields the same outcome given the same backing data. The remote
    /// fetch is aborted by dropping the returned future.
    pub async fn evaluate(
        &self,
        requirement: &PolicyRequirement,
        principal: &mut Principal,
        request: &RequestContext,
    ) -> Evaluation {
        if requirement.excluded(request) {
            debug!(
                policy = requirement.name,
                path = request.path(),
                "request excluded from policy evaluation"
            );
            return Evaluation::skipped();
        }

        let mut effects = Effects::default();
        let decision = match self
            .evaluate_tiers(requirement, principal, request, &mut effects)
            .await
        {
            Ok(decision) => decision,
            Err(err) => {
                error!(
                    policy = requirement.name,
                    user_id = ?principal.user_id(),
                    error = %err,
                    "policy evaluation failed"
                );
                Decision::Denied
            }
        };

        Evaluation {
            decision,
            redirect: effects.redirect,
            principal_refreshed: effects.principal_refreshed,
        }
    }

    async fn evaluate_tiers(
        &self,
        requirement: &PolicyRequirement,
        principal: &mut Principal,
        request: &RequestContext,
        effects: &mut Effects,
    ) -> Result<Decision, EngineError> {
        if !principal.is_authenticated() {
            warn!(policy = requirement.name, "user is unauthenticated");
            return Ok(Decision::Denied);
        }

        let mut session = LazySession::new(&self.sessions, request);

        // Claim tier: data already on the principal, nothing to mutate.
        if self
            .is_user_allowed(requirement, principal, request, &mut session, effects)
            .await?
        {
            return Ok(self.granted(requirement, principal));
        }

        // Cache tier. Whatever the session holds is authoritative: a role
        // mismatch against cached data is final, not a reason to refetch.
        let cached = session.get().await?.user_data().cloned();
        if let Some(user_data) = cached {
            self.refresh_principal(principal, &user_data, effects)?;
            if self
                .is_user_allowed(requirement, principal, request, &mut session, effects)
                .await?
            {
                return Ok(self.granted(requirement, principal));
            }
            return Ok(self.denied(requirement, principal));
        }

        // Remote tier, reached only on a true cache miss.
        let fetched = if requirement.organisation_scoped() {
            self.fetch_organisation_scoped(principal, &mut session, effects)
                .await?
        } else {
            self.fetch_generic(principal).await
        };
        let Some(user_data) = fetched else {
            return Ok(self.denied(requirement, principal));
        };

        session.get().await?.set_user_data(user_data.clone());
        session.save().await?;
        self.refresh_principal(principal, &user_data, effects)?;

        if self
            .is_user_allowed(requirement, principal, request, &mut session, effects)
            .await?
        {
            return Ok(self.granted(requirement, principal));
        }

        Ok(self.denied(requirement, principal))
    }

    /// Generic remote flow: one fetch from the fixed account endpoint.
    async fn fetch_generic(&self, principal: &Principal) -> Option<UserData> {
        let user_data = self
            .directory
            .user_organisations(&self.config.facade_user_account_endpoint)
            .await?;
        info!(
            user_id = ?principal.user_id(),
            "user data fetched from the account facade"
        );
        Some(user_data)
    }

    /// Organisation-scoped remote flow: fetch by service key, then narrow
    /// the result to the single resolved active organisation.
    async fn fetch_organisation_scoped(
        &self,
        principal: &Principal,
        session: &mut LazySession<'_, S>,
        effects: &mut Effects,
    ) -> Result<Option<UserData>, EngineError> {
        let endpoint = self.config.service_account_endpoint(&self.service_key);
        let Some(mut user_data) = self.directory.user_organisations(&endpoint).await else {
            return Ok(None);
        };

        if user_data.organisations.is_empty() {
            warn!(
                user_id = ?principal.user_id(),
                "user has no organisations assigned"
            );
            return Ok(None);
        }

        let resolved = {
            let state = session.get().await?;
            match resolve_active_organisation(&user_data.organisations, state.user_data()) {
                Ok(organisation) => organisation.clone(),
                Err(reason) => {
                    warn!(
                        user_id = ?principal.user_id(),
                        %reason,
                        "active organisation could not be resolved"
                    );
                    self.redirect_to_select_organisation(principal, effects);
                    return Ok(None);
                }
            }
        };

        info!(
            user_id = ?principal.user_id(),
            organisation_id = ?resolved.id,
            "user organisation resolved"
        );

        let resolved_id = resolved.id;
        user_data.organisations = vec![resolved];
        if let Some(id) = resolved_id {
            session.get().await?.set_selected_organisation_id(id);
        }

        Ok(Some(user_data))
    }

    /// Apply the policy's role predicate to the principal's current claims.
    async fn is_user_allowed(
        &self,
        requirement: &PolicyRequirement,
        principal: &Principal,
        request: &RequestContext,
        session: &mut LazySession<'_, S>,
        effects: &mut Effects,
    ) -> Result<bool, EngineError> {
        let Some(user_data) = principal.user_data() else {
            return Ok(false);
        };

        match &requirement.check {
            RoleCheck::Basic { .. } => Ok(requirement.check.basic_allows(&user_data)),
            RoleCheck::Enrolment { service_role_keys } => {
                // A flat service-role match with an active enrolment status
                // qualifies without resolving an organisation.
                let flat_match = user_data
                    .service_role
                    .as_deref()
                    .is_some_and(|role| service_role_keys.iter().any(|key| *key == role));
                if flat_match && user_data.has_active_enrolment_status() {
                    return Ok(true);
                }

                let Some(organisation_id) = self
                    .active_organisation_id(principal, request, session)
                    .await?
                else {
                    self.redirect_to_select_organisation(principal, effects);
                    return Ok(false);
                };

                Ok(user_data
                    .organisation(organisation_id)
                    .is_some_and(|organisation| {
                        organisation.enrolments.iter().any(|enrolment| {
                            enrolment
                                .service_role_key
                                .as_deref()
                                .is_some_and(|key| service_role_keys.iter().any(|k| *k == key))
                        })
                    }))
            }
        }
    }

    /// Resolve the active organisation id: session state first, then the
    /// `organisationId` route value. A route-resolved choice is persisted
    /// back to the session immediately.
    async fn active_organisation_id(
        &self,
        principal: &Principal,
        request: &RequestContext,
        session: &mut LazySession<'_, S>,
    ) -> Result<Option<Uuid>, EngineError> {
        let state = session.get().await?;
        if let Some(id) = state.selected_organisation_id() {
            if !id.is_nil() {
                return Ok(Some(id));
            }
        }

        let Some(raw) = request.route_value(ORGANISATION_ID_ROUTE_KEY) else {
            warn!(
                user_id = ?principal.user_id(),
                "no organisation id in session or route values"
            );
            return Ok(None);
        };

        let Ok(id) = Uuid::parse_str(raw) else {
            warn!(
                user_id = ?principal.user_id(),
                organisation_id = raw,
                "organisation id route value is not a valid id"
            );
            return Ok(None);
        };
        if id.is_nil() {
            return Ok(None);
        }

        state.set_selected_organisation_id(id);
        if let Err(err) = session.save().await {
            error!(
                user_id = ?principal.user_id(),
                error = %err,
                "failed to persist selected organisation"
            );
            return Ok(None);
        }

        Ok(Some(id))
    }

    fn refresh_principal(
        &self,
        principal: &mut Principal,
        user_data: &UserData,
        effects: &mut Effects,
    ) -> Result<(), EngineError> {
        principal.set_user_data(user_data)?;
        effects.principal_refreshed = true;

        if let Some(redirect) = self.config.sign_in_redirect.as_deref() {
            if !redirect.is_empty() {
                effects.redirect = Some(redirect.to_string());
            }
        }

        Ok(())
    }

    fn redirect_to_select_organisation(&self, principal: &Principal, effects: &mut Effects) {
        if self.config.select_organisation_redirect.is_empty() {
            warn!(
                user_id = ?principal.user_id(),
                "organisation selection needed but no redirect configured"
            );
            return;
        }
        effects.redirect = Some(self.config.select_organisation_redirect.clone());
    }

    fn granted(&self, requirement: &PolicyRequirement, principal: &Principal) -> Decision {
        info!(
            user_id = ?principal.user_id(),
            policy = requirement.name,
            "user has permission to {}",
            requirement.description
        );
        Decision::Granted
    }

    fn denied(&self, requirement: &PolicyRequirement, principal: &Principal) -> Decision {
        warn!(
            user_id = ?principal.user_id(),
            policy = requirement.name,
            "user does not have permission to {}",
            requirement.description
        );
        Decision::Denied
    }
}
