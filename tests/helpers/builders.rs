use std::sync::Arc;

use claimgate::authz::{
    claim_types, Authorizer, Claim, DynamicPolicyOptions, Identity, Policy, PolicyProvider,
    PolicyRegistry, Principal,
};

/// Builder for creating test identities
pub struct IdentityBuilder {
    label: String,
    claims: Vec<Claim>,
}

impl IdentityBuilder {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            claims: Vec::new(),
        }
    }

    pub fn claim(mut self, claim_type: &str, value: &str) -> Self {
        self.claims.push(Claim::new(claim_type, value));
        self
    }

    pub fn role(self, role: &str) -> Self {
        self.claim(claim_types::ROLE, role)
    }

    pub fn security_level(self, level: &str) -> Self {
        self.claim(claim_types::SECURITY_LEVEL, level)
    }

    pub fn build(self) -> Identity {
        Identity::new(self.label, self.claims)
    }
}

/// Builder for creating test principals
#[derive(Default)]
pub struct PrincipalBuilder {
    identities: Vec<Identity>,
}

impl PrincipalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(mut self, identity: IdentityBuilder) -> Self {
        self.identities.push(identity.build());
        self
    }

    pub fn build(self) -> Principal {
        Principal::new(self.identities)
    }

    /// Two identities from independent issuers, as produced by a sign-in
    /// that merges a personal and a government identity.
    pub fn bob() -> Principal {
        Self::new()
            .identity(
                IdentityBuilder::new("Grandma Identity")
                    .claim(claim_types::NAME, "Bob")
                    .claim(claim_types::EMAIL, "Bob@fmail.com")
                    .claim(claim_types::DATE_OF_BIRTH, "11/11/2000")
                    .role("Admin")
                    .role("AdminTwo")
                    .security_level("7")
                    .claim("Grandma.Says", "Very nice man."),
            )
            .identity(
                IdentityBuilder::new("Government")
                    .claim(claim_types::NAME, "Komal Shah")
                    .claim("DrivingLicense", "A+"),
            )
            .build()
    }
}

pub fn authorizer_with(policies: Vec<Policy>) -> Authorizer {
    let registry = PolicyRegistry::from_policies(policies).expect("unique policy names");
    let provider = PolicyProvider::new(registry, DynamicPolicyOptions::default())
        .expect("valid dynamic options");
    Authorizer::new(Arc::new(provider))
}
