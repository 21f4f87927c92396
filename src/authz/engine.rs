use crate::authz::claims::{claim_types, Principal};
use crate::authz::types::{Decision, FailedRequirement, Policy, Requirement};

/// Evaluate every requirement of `policy` against `principal`.
///
/// All requirements are checked so the deny lists each one that failed.
/// An empty policy always allows.
pub fn authorize(principal: &Principal, policy: &Policy) -> Decision {
    let failed: Vec<FailedRequirement> = policy
        .requirements
        .iter()
        .enumerate()
        .filter(|(_, requirement)| !is_satisfied(principal, requirement))
        .map(|(index, requirement)| FailedRequirement {
            index,
            requirement: requirement.clone(),
        })
        .collect();

    let decision = if failed.is_empty() {
        Decision::Allow
    } else {
        Decision::Deny(failed)
    };

    tracing::debug!(
        policy = %policy.name,
        allowed = decision.is_allowed(),
        failed = decision.failed().len(),
        "Evaluated policy"
    );

    decision
}

/// Check a single requirement against the union of the principal's claims.
pub fn is_satisfied(principal: &Principal, requirement: &Requirement) -> bool {
    match requirement {
        Requirement::Authenticated => principal.is_authenticated(),
        Requirement::HasClaimType(claim_type) => principal.has_claim(claim_type),
        Requirement::HasClaimValue { claim_type, value } => {
            principal.has_claim_value(claim_type, value)
        }
        Requirement::HasRole(role) => principal.has_claim_value(claim_types::ROLE, role),
        Requirement::MinNumericClaim {
            claim_type,
            threshold,
        } => principal
            .find_all(claim_type)
            .filter_map(|c| parse_numeric(c.value()))
            .any(|v| v >= *threshold),
    }
}

/// Claims come from outside; anything that isn't an integer never matches.
fn parse_numeric(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}
