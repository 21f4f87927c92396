pub mod authorizer;
pub mod claims;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod policy;
pub mod provider;
pub mod types;
pub mod web;

pub use authorizer::Authorizer;
pub use claims::{claim_types, Claim, Identity, Principal};
pub use errors::AuthzError;
pub use provider::{DynamicPolicyOptions, PolicyProvider, PolicyRegistry};
pub use types::{Decision, FailedRequirement, Policy, Requirement};
