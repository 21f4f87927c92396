//! Policy resolution: static registry first, then the dynamic name grammar.
//!
//! A dynamic name is `<prefix><digits>`, e.g. `Level5`. The suffix becomes the
//! threshold of a single `MinNumericClaim` requirement over the security level
//! claim. Synthesized policies are cached under their exact name.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::authz::claims::claim_types;
use crate::authz::errors::AuthzError;
use crate::authz::types::{Policy, Requirement};

/// Digits in `i64::MAX`.
const MAX_SUFFIX_DIGITS: usize = 19;

/// Statically authored policies, keyed by unique name.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, Arc<Policy>>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_policies(policies: impl IntoIterator<Item = Policy>) -> Result<Self, AuthzError> {
        let mut registry = Self::new();
        for policy in policies {
            registry.insert(policy)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, policy: Policy) -> Result<(), AuthzError> {
        if self.policies.contains_key(&policy.name) {
            return Err(AuthzError::DuplicatePolicy(policy.name));
        }
        self.policies.insert(policy.name.clone(), Arc::new(policy));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Policy>> {
        self.policies.get(name)
    }

    /// Sorted policy names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.policies.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct DynamicPolicyOptions {
    /// Literal tag in front of the threshold, e.g. "Level"
    pub prefix: String,
    /// Claim type the synthesized requirement compares against
    pub security_level_claim_type: String,
}

impl Default for DynamicPolicyOptions {
    fn default() -> Self {
        Self {
            prefix: "Level".to_string(),
            security_level_claim_type: claim_types::SECURITY_LEVEL.to_string(),
        }
    }
}

/// Parse a dynamic policy name.
///
/// `Ok(None)` when the name does not carry the prefix, an error when it does
/// but the rest is not a canonical non-negative integer. Leading zeros are
/// rejected so each threshold maps to exactly one cacheable name.
pub fn parse_dynamic_name(prefix: &str, name: &str) -> Result<Option<i64>, AuthzError> {
    let Some(suffix) = name.strip_prefix(prefix) else {
        return Ok(None);
    };

    let malformed = |reason: &str| AuthzError::MalformedDynamicName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if suffix.is_empty() {
        return Err(malformed("missing numeric suffix"));
    }
    if suffix.len() > MAX_SUFFIX_DIGITS {
        return Err(malformed("suffix is out of range"));
    }
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("suffix is not a non-negative integer"));
    }
    if suffix.len() > 1 && suffix.starts_with('0') {
        return Err(malformed("suffix has leading zeros"));
    }
    suffix
        .parse::<i64>()
        .map(Some)
        .map_err(|_| malformed("suffix is out of range"))
}

/// Resolves policy names to policies. Shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct PolicyProvider {
    registry: PolicyRegistry,
    options: DynamicPolicyOptions,
    dynamic: RwLock<HashMap<String, Arc<Policy>>>,
    synthesized: AtomicUsize,
}

impl PolicyProvider {
    pub fn new(registry: PolicyRegistry, options: DynamicPolicyOptions) -> Result<Self, AuthzError> {
        if options.prefix.is_empty() {
            return Err(AuthzError::InvalidPolicy(
                "dynamic policy prefix must not be empty".into(),
            ));
        }

        for name in registry.names() {
            if let Ok(Some(_)) = parse_dynamic_name(&options.prefix, &name) {
                tracing::warn!(policy = %name, "static policy shadows dynamic policy name");
            }
        }

        Ok(Self {
            registry,
            options,
            dynamic: RwLock::new(HashMap::new()),
            synthesized: AtomicUsize::new(0),
        })
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn options(&self) -> &DynamicPolicyOptions {
        &self.options
    }

    /// Name of the dynamic policy for a given level, e.g. `Level5`.
    pub fn level_policy_name(&self, level: u32) -> String {
        format!("{}{}", self.options.prefix, level)
    }

    /// Number of dynamic policies built so far.
    pub fn synthesized_count(&self) -> usize {
        self.synthesized.load(Ordering::Relaxed)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Policy>, AuthzError> {
        if let Some(policy) = self.registry.get(name) {
            return Ok(Arc::clone(policy));
        }
        if let Some(policy) = self.dynamic.read().get(name) {
            return Ok(Arc::clone(policy));
        }

        let threshold = match parse_dynamic_name(&self.options.prefix, name) {
            Ok(Some(threshold)) => threshold,
            Ok(None) => {
                tracing::warn!(policy = %name, "policy not found");
                return Err(AuthzError::PolicyNotFound(name.to_string()));
            }
            Err(e) => {
                tracing::warn!(policy = %name, error = %e, "malformed dynamic policy name");
                return Err(e);
            }
        };

        // Another caller may have inserted the same name since the read above;
        // the entry keeps the first one.
        let mut cache = self.dynamic.write();
        let policy = cache
            .entry(name.to_string())
            .or_insert_with(|| {
                self.synthesized.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(policy = %name, threshold, "synthesized dynamic policy");
                Arc::new(Policy::new(
                    name,
                    vec![Requirement::MinNumericClaim {
                        claim_type: self.options.security_level_claim_type.clone(),
                        threshold,
                    }],
                ))
            });
        Ok(Arc::clone(policy))
    }
}
