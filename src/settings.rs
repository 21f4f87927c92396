use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::authz::claims::claim_types;
use crate::authz::provider::DynamicPolicyOptions;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub server: Server,
    pub authz: Authz,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authz {
    /// Directory scanned for `*.kdl` policy files
    pub policies_dir: PathBuf,
    /// Prefix of dynamic policy names, e.g. "Level" for "Level5"
    pub dynamic_prefix: String,
    /// Claim type compared by dynamic policies and the security-level gate
    pub security_level_claim_type: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
        }
    }
}

impl Default for Authz {
    fn default() -> Self {
        Self {
            policies_dir: PathBuf::from("policies"),
            dynamic_prefix: "Level".to_string(),
            security_level_claim_type: claim_types::SECURITY_LEVEL.to_string(),
        }
    }
}

impl Authz {
    pub fn dynamic_options(&self) -> DynamicPolicyOptions {
        DynamicPolicyOptions {
            prefix: self.dynamic_prefix.clone(),
            security_level_claim_type: self.security_level_claim_type.clone(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server.host", Server::default().host)
            .into_diagnostic()?
            .set_default("server.port", Server::default().port)
            .into_diagnostic()?
            .set_default(
                "authz.policies_dir",
                Authz::default().policies_dir.to_string_lossy().to_string(),
            )
            .into_diagnostic()?
            .set_default("authz.dynamic_prefix", Authz::default().dynamic_prefix)
            .into_diagnostic()?
            .set_default(
                "authz.security_level_claim_type",
                Authz::default().security_level_claim_type,
            )
            .into_diagnostic()?;

        // Optional file
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: CLAIMGATE__SERVER__PORT=9090, etc.
        builder =
            builder.add_source(config::Environment::with_prefix("CLAIMGATE").separator("__"));

        let cfg = builder.build().into_diagnostic()?;
        let mut s: Settings = cfg.try_deserialize().into_diagnostic()?;

        if s.authz.dynamic_prefix.is_empty() {
            return Err(miette::miette!(
                code = "claimgate::config::dynamic_prefix",
                help = "Set authz.dynamic_prefix to a literal such as \"Level\"",
                "dynamic policy prefix must not be empty"
            ));
        }

        // Normalize policies path to be relative to current dir
        if s.authz.policies_dir.is_relative() {
            s.authz.policies_dir = std::env::current_dir()
                .into_diagnostic()?
                .join(&s.authz.policies_dir);
        }

        Ok(s)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
