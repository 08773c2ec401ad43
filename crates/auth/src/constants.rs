//! Well-known role, status and service identifiers.
//!
//! These are the stable string values exchanged with the account facade and
//! stored in claims; display names and keys are distinct namespaces.

/// Display-friendly service roles carried in `UserData::service_role`.
pub mod service_roles {
    pub const NOT_SET: &str = "NotSet";
    pub const APPROVED_PERSON: &str = "Approved Person";
    pub const DELEGATED_PERSON: &str = "Delegated Person";
    pub const BASIC_USER: &str = "Basic User";
    pub const STANDARD_USER: &str = "Standard User";
    pub const ADMIN_USER: &str = "Admin User";
    pub const REGULATOR_BASIC: &str = "Regulator Basic";
    pub const REGULATOR_ADMIN: &str = "Regulator Admin";
}

/// Stable per-service role keys carried on enrolments.
pub mod service_role_keys {
    pub const ADMIN_USER: &str = "Re-Ex.AdminUser";
    pub const BASIC_USER: &str = "Re-Ex.BasicUser";
    pub const STANDARD_USER: &str = "Re-Ex.StandardUser";
    pub const APPROVED_PERSON: &str = "Re-Ex.ApprovedPerson";
    pub const DELEGATED_PERSON: &str = "Re-Ex.DelegatedPerson";
}

/// Service identifiers used to parameterise facade endpoints.
pub mod service_keys {
    pub const REPROCESSOR_EXPORTER: &str = "Re-Ex";
}

/// Enrolment lifecycle statuses. `Enrolled`, `Approved` and `Pending`
/// count as active; everything else is inactive.
pub mod enrolment_status {
    pub const NOT_SET: &str = "NotSet";
    pub const ENROLLED: &str = "Enrolled";
    pub const APPROVED: &str = "Approved";
    pub const PENDING: &str = "Pending";
    pub const REJECTED: &str = "Rejected";

    pub const ACTIVE: &[&str] = &[ENROLLED, APPROVED, PENDING];
}

/// Roles a person can hold within their organisation.
pub mod organisation_roles {
    pub const ADMIN: &str = "Admin";
    pub const EMPLOYEE: &str = "Employee";
}
