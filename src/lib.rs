//! Claimgate - claims-based authorization policy engine
//!
//! Combines identities from independent issuers into one principal, resolves
//! named policies (including parametrized `Level<n>` policies synthesized on
//! demand) and evaluates them into allow/deny decisions.

pub mod authz;
pub mod check;
pub mod errors;
pub mod settings;
pub mod web;
