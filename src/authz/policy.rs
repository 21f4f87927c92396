use crate::authz::errors::AuthzError;
use crate::authz::types::*;
use kdl::{KdlDocument, KdlNode};

/// Parse a KDL document string into typed policies.
///
/// ```kdl
/// policy "Licensed" {
///     authenticated
///     claim "DrivingLicense" value="A+"
///     role "Admin"
///     min-claim "SecurityLevel" 3
/// }
/// ```
pub fn parse_kdl_document(source: &str) -> Result<ParsedPolicy, AuthzError> {
    let doc: KdlDocument = source
        .parse()
        .map_err(|e: kdl::KdlError| AuthzError::KdlParse(e.to_string()))?;

    let mut parsed = ParsedPolicy::default();

    for node in doc.nodes() {
        match node.name().value() {
            "policy" => {
                let name = first_string_arg(node).ok_or_else(|| {
                    AuthzError::InvalidPolicy(
                        "policy node requires a string argument (e.g. policy \"Claim.DoB\")".into(),
                    )
                })?;

                let mut requirements = Vec::new();
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        requirements.push(parse_requirement(child, &name)?);
                    }
                }

                parsed.policies.push(Policy::new(name, requirements));
            }
            other => {
                tracing::warn!("ignoring unknown top-level KDL node `{other}`");
            }
        }
    }

    Ok(parsed)
}

fn parse_requirement(node: &KdlNode, policy: &str) -> Result<Requirement, AuthzError> {
    let kind = node.name().value();
    let missing_arg = || {
        AuthzError::InvalidPolicy(format!(
            "`{kind}` in policy `{policy}` requires a string argument"
        ))
    };

    match kind {
        "authenticated" => Ok(Requirement::Authenticated),
        "claim" => {
            let claim_type = first_string_arg(node).ok_or_else(missing_arg)?;
            match node.get("value").and_then(|v| v.as_string()) {
                Some(value) => Ok(Requirement::HasClaimValue {
                    claim_type,
                    value: value.to_string(),
                }),
                None => Ok(Requirement::HasClaimType(claim_type)),
            }
        }
        "role" => Ok(Requirement::HasRole(
            first_string_arg(node).ok_or_else(missing_arg)?,
        )),
        "min-claim" => {
            let claim_type = first_string_arg(node).ok_or_else(missing_arg)?;
            let threshold = node
                .entries()
                .iter()
                .filter(|e| e.name().is_none())
                .find_map(|e| e.value().as_integer())
                .ok_or_else(|| {
                    AuthzError::InvalidPolicy(format!(
                        "`min-claim` in policy `{policy}` requires an integer threshold (e.g. min-claim \"SecurityLevel\" 5)"
                    ))
                })?;
            let threshold = i64::try_from(threshold).map_err(|_| {
                AuthzError::InvalidPolicy(format!(
                    "threshold {threshold} in policy `{policy}` is out of range"
                ))
            })?;
            Ok(Requirement::MinNumericClaim {
                claim_type,
                threshold,
            })
        }
        other => Err(AuthzError::InvalidPolicy(format!(
            "unexpected child `{other}` in policy `{policy}` (expected `authenticated`, `claim`, `role` or `min-claim`)"
        ))),
    }
}

/// Extract the first string argument from a KDL node.
fn first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}
