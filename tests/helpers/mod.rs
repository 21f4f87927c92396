#![allow(dead_code)]

pub mod builders;

pub use builders::{authorizer_with, IdentityBuilder, PrincipalBuilder};
