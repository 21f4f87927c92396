use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AuthzError {
    #[error("No policy named `{0}`")]
    #[diagnostic(
        code(claimgate::authz::policy_not_found),
        help("Register the policy in a `.kdl` file or use the dynamic form <prefix><level>")
    )]
    PolicyNotFound(String),

    #[error("Malformed dynamic policy name `{name}`: {reason}")]
    #[diagnostic(
        code(claimgate::authz::malformed_dynamic_name),
        help("Dynamic policy names are the configured prefix followed by a non-negative integer, e.g. Level5")
    )]
    MalformedDynamicName { name: String, reason: String },

    #[error("Policy `{0}` is defined more than once")]
    #[diagnostic(
        code(claimgate::authz::duplicate_policy),
        help("Policy names must be unique across all policy files")
    )]
    DuplicatePolicy(String),

    #[error("Failed to load policy file `{path}`")]
    #[diagnostic(
        code(claimgate::authz::policy_load),
        help("Check that the file exists and contains valid KDL syntax")
    )]
    PolicyLoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid policy: {0}")]
    #[diagnostic(
        code(claimgate::authz::invalid_policy),
        help("Policy children are `authenticated`, `claim \"type\" [value=\"v\"]`, `role \"name\"` or `min-claim \"type\" <n>`")
    )]
    InvalidPolicy(String),

    #[error("KDL parse error: {0}")]
    #[diagnostic(
        code(claimgate::authz::kdl_parse),
        help("Check your KDL file syntax, see https://kdl.dev for the specification")
    )]
    KdlParse(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(claimgate::authz::io))]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    /// True for both resolution failures. Callers treat them alike and deny.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AuthzError::PolicyNotFound(_) | AuthzError::MalformedDynamicName { .. }
        )
    }
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let status = match &self {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            AuthzError::InvalidPolicy(_)
            | AuthzError::KdlParse(_)
            | AuthzError::DuplicatePolicy(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_covers_both_resolution_failures() {
        assert!(AuthzError::PolicyNotFound("Nope".into()).is_not_found());
        assert!(AuthzError::MalformedDynamicName {
            name: "LevelXYZ".into(),
            reason: "not a number".into(),
        }
        .is_not_found());
        assert!(!AuthzError::DuplicatePolicy("Admin".into()).is_not_found());
    }

    #[test]
    fn test_status_codes() {
        let resp = AuthzError::PolicyNotFound("Nope".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = AuthzError::InvalidPolicy("bad".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
