//! Authorization data model: a principal's roles, enrolments and
//! organisation memberships.
//!
//! `UserData` is serialized to a single camelCase JSON value that is used
//! both as the account facade's response payload and as the claims-carried
//! cache, so the two must round-trip identically.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::enrolment_status;

/// Immutable-per-request snapshot of a principal's authorization data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserData {
    pub service_role: Option<String>,
    pub role_in_organisation: Option<String>,
    pub enrolment_status: Option<String>,
    pub organisations: Vec<Organisation>,
}

/// An organisation the principal is a member of.
///
/// An organisation without an id cannot be matched by ID lookups and is
/// treated as unresolvable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Organisation {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub person_role_in_organisation: Option<String>,
    pub enrolments: Vec<Enrolment>,
}

/// A registration against a specific service role within an organisation.
///
/// `service_role_key` is the authorization-relevant discriminator;
/// `enrolment_status` gates whether the enrolment counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Enrolment {
    pub service_role_key: Option<String>,
    pub enrolment_status: Option<String>,
    pub service_role: Option<String>,
    pub service: Option<String>,
    pub service_key: Option<String>,
}

/// Account facade response body: `{ "user": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAccount {
    pub user: UserData,
}

fn is_active_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| enrolment_status::ACTIVE.contains(&s))
}

impl UserData {
    /// Find a member organisation by id. Organisations without an id never
    /// match.
    pub fn organisation(&self, id: Uuid) -> Option<&Organisation> {
        self.organisations.iter().find(|org| org.id == Some(id))
    }

    /// Whether the flat `enrolment_status` field is an active status.
    pub fn has_active_enrolment_status(&self) -> bool {
        is_active_status(self.enrolment_status.as_deref())
    }

    /// Regulator check: either regulator service role, with an active
    /// enrolment status.
    pub fn is_regulator(&self) -> bool {
        use crate::constants::service_roles::{REGULATOR_ADMIN, REGULATOR_BASIC};

        matches!(
            self.service_role.as_deref(),
            Some(REGULATOR_BASIC) | Some(REGULATOR_ADMIN)
        ) && self.has_active_enrolment_status()
    }

    pub fn is_regulator_admin(&self) -> bool {
        self.service_role.as_deref() == Some(crate::constants::service_roles::REGULATOR_ADMIN)
    }

    /// An organisation admin with an active enrolment status.
    pub fn is_enrolled_admin(&self) -> bool {
        self.role_in_organisation.as_deref() == Some(crate::constants::organisation_roles::ADMIN)
            && self.has_active_enrolment_status()
    }

    pub fn is_approved_or_delegated_person(&self) -> bool {
        use crate::constants::service_roles::{APPROVED_PERSON, DELEGATED_PERSON};

        matches!(
            self.service_role.as_deref(),
            Some(APPROVED_PERSON) | Some(DELEGATED_PERSON)
        )
    }

    /// An organisation admin, or a basic-user employee, with an active
    /// enrolment status.
    pub fn is_enrolled_admin_or_basic(&self) -> bool {
        use crate::constants::organisation_roles::{ADMIN, EMPLOYEE};
        use crate::constants::service_roles::BASIC_USER;

        let admin = self.role_in_organisation.as_deref() == Some(ADMIN);
        let basic_employee = self.service_role.as_deref() == Some(BASIC_USER)
            && self.role_in_organisation.as_deref() == Some(EMPLOYEE);

        (admin || basic_employee) && self.has_active_enrolment_status()
    }

    /// Producer-side upload check: an allowed service role or an admin
    /// organisation role, and never a regulator.
    pub fn can_upload_files(&self) -> bool {
        use crate::constants::organisation_roles::ADMIN;
        use crate::constants::service_roles::{
            APPROVED_PERSON, BASIC_USER, DELEGATED_PERSON, REGULATOR_ADMIN, REGULATOR_BASIC,
        };

        let service_role_allowed = matches!(
            self.service_role.as_deref(),
            Some(APPROVED_PERSON) | Some(DELEGATED_PERSON) | Some(BASIC_USER)
        );
        let person_role_allowed = self.role_in_organisation.as_deref() == Some(ADMIN);
        let regulator = matches!(
            self.service_role.as_deref(),
            Some(REGULATOR_BASIC) | Some(REGULATOR_ADMIN)
        );

        (service_role_allowed || person_role_allowed) && !regulator
    }
}

impl Enrolment {
    /// Whether this enrolment's status is an active one.
    pub fn is_active(&self) -> bool {
        is_active_status(self.enrolment_status.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{enrolment_status, organisation_roles, service_role_keys, service_roles};
    use proptest::prelude::*;

    fn enrolment(key: &str, status: &str) -> Enrolment {
        Enrolment {
            service_role_key: Some(key.to_string()),
            enrolment_status: Some(status.to_string()),
            ..Enrolment::default()
        }
    }

    #[test]
    fn organisation_lookup_matches_by_id() {
        let id = Uuid::now_v7();
        let user_data = UserData {
            organisations: vec![
                Organisation {
                    id: None,
                    name: Some("No Id Ltd".to_string()),
                    ..Organisation::default()
                },
                Organisation {
                    id: Some(id),
                    name: Some("Acme Reprocessing".to_string()),
                    ..Organisation::default()
                },
            ],
            ..UserData::default()
        };

        assert_eq!(
            user_data.organisation(id).and_then(|o| o.name.as_deref()),
            Some("Acme Reprocessing")
        );
        assert!(user_data.organisation(Uuid::now_v7()).is_none());
    }

    #[test]
    fn organisation_without_id_never_matches() {
        let user_data = UserData {
            organisations: vec![Organisation::default()],
            ..UserData::default()
        };

        assert!(user_data.organisation(Uuid::nil()).is_none());
    }

    #[test]
    fn regulator_requires_active_enrolment_status() {
        let mut user_data = UserData {
            service_role: Some(service_roles::REGULATOR_BASIC.to_string()),
            enrolment_status: Some(enrolment_status::ENROLLED.to_string()),
            ..UserData::default()
        };
        assert!(user_data.is_regulator());

        user_data.enrolment_status = Some(enrolment_status::REJECTED.to_string());
        assert!(!user_data.is_regulator());

        user_data.service_role = Some(service_roles::BASIC_USER.to_string());
        user_data.enrolment_status = Some(enrolment_status::ENROLLED.to_string());
        assert!(!user_data.is_regulator());
    }

    #[test]
    fn enrolled_admin_checks_role_and_status() {
        let user_data = UserData {
            role_in_organisation: Some(organisation_roles::ADMIN.to_string()),
            enrolment_status: Some(enrolment_status::PENDING.to_string()),
            ..UserData::default()
        };
        assert!(user_data.is_enrolled_admin());

        let employee = UserData {
            role_in_organisation: Some(organisation_roles::EMPLOYEE.to_string()),
            ..user_data.clone()
        };
        assert!(!employee.is_enrolled_admin());
    }

    #[test]
    fn enrolled_admin_or_basic_accepts_basic_employee() {
        let user_data = UserData {
            service_role: Some(service_roles::BASIC_USER.to_string()),
            role_in_organisation: Some(organisation_roles::EMPLOYEE.to_string()),
            enrolment_status: Some(enrolment_status::APPROVED.to_string()),
            ..UserData::default()
        };
        assert!(user_data.is_enrolled_admin_or_basic());

        let standard_employee = UserData {
            service_role: Some(service_roles::STANDARD_USER.to_string()),
            ..user_data.clone()
        };
        assert!(!standard_employee.is_enrolled_admin_or_basic());
    }

    #[test]
    fn regulators_cannot_upload_files() {
        let regulator_admin = UserData {
            service_role: Some(service_roles::REGULATOR_ADMIN.to_string()),
            role_in_organisation: Some(organisation_roles::ADMIN.to_string()),
            ..UserData::default()
        };
        assert!(!regulator_admin.can_upload_files());

        let approved = UserData {
            service_role: Some(service_roles::APPROVED_PERSON.to_string()),
            ..UserData::default()
        };
        assert!(approved.can_upload_files());
    }

    #[test]
    fn facade_payload_deserializes_from_camel_case() {
        let id = Uuid::now_v7();
        let body = format!(
            r#"{{"user":{{"serviceRole":"Admin User","organisations":[{{"id":"{id}","enrolments":[{{"serviceRoleKey":"Re-Ex.AdminUser","enrolmentStatus":"Enrolled"}}]}}]}}}}"#
        );

        let account: UserAccount = serde_json::from_str(&body).unwrap();
        assert_eq!(account.user.service_role.as_deref(), Some("Admin User"));
        assert_eq!(account.user.organisations.len(), 1);

        let org = &account.user.organisations[0];
        assert_eq!(org.id, Some(id));
        assert_eq!(
            org.enrolments[0].service_role_key.as_deref(),
            Some(service_role_keys::ADMIN_USER)
        );
        assert!(org.enrolments[0].is_active());
    }

    #[test]
    fn user_data_round_trips_through_claims_json() {
        let user_data = UserData {
            service_role: Some(service_roles::ADMIN_USER.to_string()),
            role_in_organisation: Some(organisation_roles::ADMIN.to_string()),
            enrolment_status: Some(enrolment_status::ENROLLED.to_string()),
            organisations: vec![Organisation {
                id: Some(Uuid::now_v7()),
                name: Some("Acme Reprocessing".to_string()),
                person_role_in_organisation: Some(organisation_roles::ADMIN.to_string()),
                enrolments: vec![enrolment(
                    service_role_keys::ADMIN_USER,
                    enrolment_status::ENROLLED,
                )],
            }],
        };

        let claim = serde_json::to_string(&user_data).unwrap();
        let restored: UserData = serde_json::from_str(&claim).unwrap();
        assert_eq!(restored, user_data);
    }

    // Strategies kept shallow on purpose: the claim payload is a plain data
    // tree, so one organisation level is enough to pin the field mapping.
    fn arb_enrolment() -> impl Strategy<Value = Enrolment> {
        (
            proptest::option::of("[A-Za-z.-]{1,20}"),
            proptest::option::of("[A-Za-z]{1,10}"),
        )
            .prop_map(|(service_role_key, enrolment_status)| Enrolment {
                service_role_key,
                enrolment_status,
                ..Enrolment::default()
            })
    }

    fn arb_organisation() -> impl Strategy<Value = Organisation> {
        (
            proptest::option::of(proptest::arbitrary::any::<u128>()),
            proptest::option::of("[A-Za-z ]{0,20}"),
            proptest::collection::vec(arb_enrolment(), 0..3),
        )
            .prop_map(|(id, name, enrolments)| Organisation {
                id: id.map(Uuid::from_u128),
                name,
                person_role_in_organisation: None,
                enrolments,
            })
    }

    proptest! {
        #[test]
        fn any_user_data_round_trips(
            service_role in proptest::option::of("[A-Za-z ]{0,16}"),
            role_in_organisation in proptest::option::of("[A-Za-z]{0,10}"),
            enrolment_status in proptest::option::of("[A-Za-z]{0,10}"),
            organisations in proptest::collection::vec(arb_organisation(), 0..4),
        ) {
            let user_data = UserData {
                service_role,
                role_in_organisation,
                enrolment_status,
                organisations,
            };

            let claim = serde_json::to_string(&user_data).unwrap();
            let restored: UserData = serde_json::from_str(&claim).unwrap();
            prop_assert_eq!(restored, user_data);
        }
    }
}
