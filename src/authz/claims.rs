//! Claims, identities and principals.
//!
//! A [`Principal`] owns its [`Identity`] values and each identity owns its
//! [`Claim`]s. Nothing here is mutated after construction; evaluation always
//! looks at the union of claims across every identity.

use serde::{Deserialize, Serialize};

/// Well-known claim types.
pub mod claim_types {
    pub const ROLE: &str = "role";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const DATE_OF_BIRTH: &str = "date_of_birth";
    pub const SECURITY_LEVEL: &str = "SecurityLevel";
}

/// A single `(type, value)` assertion about the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    claim_type: String,
    value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.claim_type, self.value)
    }
}

/// Claims issued by one authentication source. The label names the issuer
/// and plays no part in evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    label: String,
    #[serde(default)]
    claims: Vec<Claim>,
}

impl Identity {
    pub fn new(label: impl Into<String>, claims: Vec<Claim>) -> Self {
        Self {
            label: label.into(),
            claims,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }
}

/// Everything known about the caller, possibly from several issuers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    #[serde(default)]
    identities: Vec<Identity>,
}

impl Principal {
    /// Combine identities as-is. Claims are not deduplicated: the same type
    /// may legitimately carry different values across issuers.
    pub fn new(identities: Vec<Identity>) -> Self {
        Self { identities }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_identity(identity: Identity) -> Self {
        Self {
            identities: vec![identity],
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identities.push(identity);
        self
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// True when some identity carries at least one claim. An identity with
    /// no claims asserts nothing about the caller.
    pub fn is_authenticated(&self) -> bool {
        self.claims().next().is_some()
    }

    /// Union of all claims, in identity order then claim order.
    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.identities.iter().flat_map(|i| i.claims.iter())
    }

    /// All claims of the given type across every identity.
    pub fn find_all<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a Claim> + 'a {
        self.claims().filter(move |c| c.claim_type == claim_type)
    }

    pub fn has_claim(&self, claim_type: &str) -> bool {
        self.find_all(claim_type).next().is_some()
    }

    pub fn has_claim_value(&self, claim_type: &str, value: &str) -> bool {
        self.find_all(claim_type).any(|c| c.value == value)
    }
}
