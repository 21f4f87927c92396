//! One-shot evaluation of a principal stored as JSON.

use std::path::Path;

use crate::authz::authorizer::Authorizer;
use crate::authz::claims::Principal;
use crate::authz::types::AuthorizeResponse;
use crate::errors::GateError;

pub fn load_principal(path: &Path) -> Result<Principal, GateError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn check_file(
    authorizer: &Authorizer,
    principal_path: &Path,
    policy: &str,
) -> Result<AuthorizeResponse, GateError> {
    let principal = load_principal(principal_path)?;
    let decision = authorizer.authorize_named(&principal, policy)?;
    Ok(AuthorizeResponse::from_decision(policy, &decision))
}
