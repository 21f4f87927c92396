use serde::{Deserialize, Serialize};

use crate::authz::claims::Principal;

/// One checkable predicate over a principal's claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// At least one identity is present.
    Authenticated,
    /// Some claim of this type exists.
    HasClaimType(String),
    /// Some claim of this type carries exactly this value.
    HasClaimValue { claim_type: String, value: String },
    /// Some role claim equals this role.
    HasRole(String),
    /// Some claim of this type parses as an integer >= threshold.
    MinNumericClaim { claim_type: String, threshold: i64 },
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Requirement::Authenticated => write!(f, "authenticated"),
            Requirement::HasClaimType(t) => write!(f, "claim {t:?}"),
            Requirement::HasClaimValue { claim_type, value } => {
                write!(f, "claim {claim_type:?} == {value:?}")
            }
            Requirement::HasRole(role) => write!(f, "role {role:?}"),
            Requirement::MinNumericClaim {
                claim_type,
                threshold,
            } => write!(f, "claim {claim_type:?} >= {threshold}"),
        }
    }
}

/// A named, immutable list of requirements that must all hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub name: String,
    pub requirements: Vec<Requirement>,
}

impl Policy {
    pub fn new(name: impl Into<String>, requirements: Vec<Requirement>) -> Self {
        Self {
            name: name.into(),
            requirements,
        }
    }
}

/// A requirement that blocked access, with its position in the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRequirement {
    pub index: usize,
    pub requirement: Requirement,
}

impl std::fmt::Display for FailedRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}: {}", self.index, self.requirement)
    }
}

/// Outcome of evaluating a policy. A deny is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Vec<FailedRequirement>),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn failed(&self) -> &[FailedRequirement] {
        match self {
            Decision::Allow => &[],
            Decision::Deny(failed) => failed,
        }
    }
}

/// Intermediate result from parsing a single KDL file.
#[derive(Debug, Clone, Default)]
pub struct ParsedPolicy {
    pub policies: Vec<Policy>,
}

// ---------- API request/response types ----------

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    #[serde(default)]
    pub principal: Principal,
    /// e.g. "Claim.DoB" or "Level5"
    pub policy: String,
}

#[derive(Debug, Deserialize)]
pub struct LevelRequest {
    #[serde(default)]
    pub principal: Principal,
    pub level: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthorizeResponse {
    pub allowed: bool,
    pub policy: String,
    /// Human-readable descriptions of the requirements that failed.
    pub failed: Vec<String>,
}

impl AuthorizeResponse {
    pub fn from_decision(policy: &str, decision: &Decision) -> Self {
        Self {
            allowed: decision.is_allowed(),
            policy: policy.to_string(),
            failed: decision
                .failed()
                .iter()
                .map(|f| f.requirement.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PoliciesResponse {
    pub policies: Vec<String>,
}
