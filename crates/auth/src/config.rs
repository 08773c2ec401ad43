//! Authorization configuration.
//!
//! The host owns loading (env, file, secrets store); this crate only
//! consumes the resolved values.

use serde::{Deserialize, Serialize};

/// Settings for the policy decision engine and its collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorizationConfig {
    /// Default service identity used for endpoint selection.
    pub service_key: String,

    /// Base URL of the account facade.
    pub facade_base_url: String,

    /// Endpoint for the generic (single-service) user account fetch.
    pub facade_user_account_endpoint: String,

    /// Endpoint template for the service-scoped user account fetch;
    /// `{serviceKey}` is substituted with the effective service key.
    pub facade_user_account_v1_endpoint: String,

    /// Where to send the browser after a claims refresh, if anywhere.
    pub sign_in_redirect: Option<String>,

    /// Where to send the browser when the active organisation is ambiguous.
    pub select_organisation_redirect: String,
}

impl AuthorizationConfig {
    /// Resolve the service-scoped account endpoint for `service_key`.
    pub fn service_account_endpoint(&self, service_key: &str) -> String {
        self.facade_user_account_v1_endpoint
            .replace("{serviceKey}", service_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_account_endpoint_substitutes_service_key() {
        let config = AuthorizationConfig {
            facade_user_account_v1_endpoint: "v1/users/{serviceKey}/organisations".to_string(),
            ..AuthorizationConfig::default()
        };

        assert_eq!(
            config.service_account_endpoint("Re-Ex"),
            "v1/users/Re-Ex/organisations"
        );
    }

    #[test]
    fn deserializes_from_camel_case_settings() {
        let config: AuthorizationConfig = serde_json::from_str(
            r#"{
                "serviceKey": "Re-Ex",
                "facadeBaseUrl": "https://facade.example",
                "facadeUserAccountEndpoint": "users/me",
                "selectOrganisationRedirect": "/select-organisation"
            }"#,
        )
        .unwrap();

        assert_eq!(config.service_key, "Re-Ex");
        assert_eq!(config.sign_in_redirect, None);
        assert_eq!(config.select_organisation_redirect, "/select-organisation");
    }
}
