//! Policy variants as data.
//!
//! Every per-endpoint-class policy is one configuration record consumed by
//! the generic decision engine: a requirement name, a human-readable
//! description, a role check, and optional endpoint exclusions.

use crate::constants::{service_role_keys, service_roles};
use crate::models::UserData;
use crate::request::RequestContext;

/// How a policy decides whether a principal's `UserData` qualifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleCheck {
    /// Pure check on the flat `service_role` / `role_in_organisation`
    /// fields. A principal qualifies when either set matches (an empty set
    /// never matches), and, when required, the flat enrolment status is
    /// active.
    Basic {
        service_roles: &'static [&'static str],
        organisation_roles: &'static [&'static str],
        require_active_enrolment: bool,
    },

    /// Organisation-scoped check: some enrolment of the resolved active
    /// organisation must carry one of the allowed service-role keys.
    Enrolment {
        service_role_keys: &'static [&'static str],
    },
}

impl RoleCheck {
    /// Evaluate a [`RoleCheck::Basic`] against the claim data.
    ///
    /// Returns `false` for [`RoleCheck::Enrolment`]; the engine resolves
    /// the active organisation before enrolment checks.
    pub fn basic_allows(&self, user_data: &UserData) -> bool {
        let RoleCheck::Basic {
            service_roles,
            organisation_roles,
            require_active_enrolment,
        } = self
        else {
            return false;
        };

        let service_role_matches = user_data
            .service_role
            .as_deref()
            .is_some_and(|role| service_roles.iter().any(|allowed| *allowed == role));
        let organisation_role_matches = user_data
            .role_in_organisation
            .as_deref()
            .is_some_and(|role| organisation_roles.iter().any(|allowed| *allowed == role));

        (service_role_matches || organisation_role_matches)
            && (!require_active_enrolment || user_data.has_active_enrolment_status())
    }
}

/// Requests a policy does not evaluate at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// The matched endpoint is explicitly anonymous-allowed.
    AllowsAnonymous,

    /// The request path starts with the given segments (case-insensitive).
    PathPrefix(&'static str),
}

impl Exclusion {
    pub fn matches(&self, request: &RequestContext) -> bool {
        match self {
            Exclusion::AllowsAnonymous => request.allows_anonymous(),
            Exclusion::PathPrefix(prefix) => path_starts_with_segments(request.path(), prefix),
        }
    }
}

// Segment-aware prefix match: "/admin/health" covers "/admin/health" and
// "/admin/health/live" but not "/admin/healthcheck".
fn path_starts_with_segments(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if path.len() < prefix.len() || !path[..prefix.len()].eq_ignore_ascii_case(prefix) {
        return false;
    }
    path.len() == prefix.len() || path.as_bytes()[prefix.len()] == b'/'
}

/// One endpoint-class authorization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRequirement {
    /// Requirement name, used in logs.
    pub name: &'static str,

    /// Human-readable description of what the policy grants.
    pub description: &'static str,

    pub check: RoleCheck,

    pub exclusions: &'static [Exclusion],
}

impl PolicyRequirement {
    /// Whether this policy needs a resolved active organisation.
    pub fn organisation_scoped(&self) -> bool {
        matches!(self.check, RoleCheck::Enrolment { .. })
    }

    pub fn excluded(&self, request: &RequestContext) -> bool {
        self.exclusions.iter().any(|e| e.matches(request))
    }
}

/// The shipped policy variants.
pub mod policies {
    use super::*;

    /// General account management for the reprocessor/exporter service.
    pub fn account_management() -> PolicyRequirement {
        PolicyRequirement {
            name: "AccountManagementPolicy",
            description: "manage users",
            check: RoleCheck::Enrolment {
                service_role_keys: &[
                    service_role_keys::ADMIN_USER,
                    service_role_keys::APPROVED_PERSON,
                    service_role_keys::STANDARD_USER,
                    service_role_keys::BASIC_USER,
                ],
            },
            exclusions: &[],
        }
    }

    /// Adding team members is restricted to admins and approved persons.
    pub fn add_team_member() -> PolicyRequirement {
        PolicyRequirement {
            name: "AddTeamMemberPolicy",
            description: "manage users",
            check: RoleCheck::Enrolment {
                service_role_keys: &[
                    service_role_keys::ADMIN_USER,
                    service_role_keys::APPROVED_PERSON,
                ],
            },
            exclusions: &[],
        }
    }

    /// Any regulator, skipping anonymous endpoints and unauthenticated
    /// probe paths (health check, error page).
    pub fn regulator_basic() -> PolicyRequirement {
        PolicyRequirement {
            name: "RegulatorBasicPolicy",
            description: service_roles::REGULATOR_BASIC,
            check: RoleCheck::Basic {
                service_roles: &[
                    service_roles::REGULATOR_BASIC,
                    service_roles::REGULATOR_ADMIN,
                ],
                organisation_roles: &[],
                require_active_enrolment: true,
            },
            exclusions: &[
                Exclusion::AllowsAnonymous,
                Exclusion::PathPrefix("/admin/health"),
                Exclusion::PathPrefix("/error"),
            ],
        }
    }

    pub fn regulator_admin() -> PolicyRequirement {
        PolicyRequirement {
            name: "RegulatorAdminPolicy",
            description: service_roles::REGULATOR_ADMIN,
            check: RoleCheck::Basic {
                service_roles: &[service_roles::REGULATOR_ADMIN],
                organisation_roles: &[],
                require_active_enrolment: false,
            },
            exclusions: &[],
        }
    }

    pub fn approved_person() -> PolicyRequirement {
        PolicyRequirement {
            name: "ApprovedPersonPolicy",
            description: "act as an approved or delegated person",
            check: RoleCheck::Basic {
                service_roles: &[
                    service_roles::APPROVED_PERSON,
                    service_roles::DELEGATED_PERSON,
                ],
                organisation_roles: &[],
                require_active_enrolment: false,
            },
            exclusions: &[],
        }
    }

    pub fn enrolled_admin() -> PolicyRequirement {
        PolicyRequirement {
            name: "EnrolledAdminPolicy",
            description: "administer their organisation",
            check: RoleCheck::Basic {
                service_roles: &[],
                organisation_roles: &[crate::constants::organisation_roles::ADMIN],
                require_active_enrolment: true,
            },
            exclusions: &[],
        }
    }
}
