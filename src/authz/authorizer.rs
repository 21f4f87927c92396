use std::sync::Arc;

use crate::authz::claims::Principal;
use crate::authz::engine;
use crate::authz::errors::AuthzError;
use crate::authz::provider::PolicyProvider;
use crate::authz::types::{Decision, Policy};

/// Resolves policy names and evaluates them for an explicitly passed principal.
#[derive(Debug, Clone)]
pub struct Authorizer {
    provider: Arc<PolicyProvider>,
}

impl Authorizer {
    pub fn new(provider: Arc<PolicyProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &PolicyProvider {
        &self.provider
    }

    /// Resolution failures are returned as errors; callers should deny.
    pub fn authorize_named(
        &self,
        principal: &Principal,
        policy_name: &str,
    ) -> Result<Decision, AuthzError> {
        self.evaluate(principal, policy_name)
            .map(|(_, decision)| decision)
    }

    /// Security-level gate. Goes through the dynamic policy of the same
    /// level so both paths share one comparison. Returns the policy that
    /// actually applied, which is a static one when it shadows the name.
    pub fn require_level(
        &self,
        principal: &Principal,
        level: u32,
    ) -> Result<(Arc<Policy>, Decision), AuthzError> {
        let name = self.provider.level_policy_name(level);
        self.evaluate(principal, &name)
    }

    fn evaluate(
        &self,
        principal: &Principal,
        policy_name: &str,
    ) -> Result<(Arc<Policy>, Decision), AuthzError> {
        let policy = self.provider.resolve(policy_name)?;
        let decision = engine::authorize(principal, &policy);
        if !decision.is_allowed() {
            let failed: Vec<String> = decision.failed().iter().map(|f| f.to_string()).collect();
            tracing::info!(policy = %policy.name, ?failed, "Access denied");
        }
        Ok((policy, decision))
    }
}
