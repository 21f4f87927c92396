use std::path::Path;

use crate::authz::errors::AuthzError;
use crate::authz::policy::parse_kdl_document;
use crate::authz::provider::PolicyRegistry;
use crate::authz::types::ParsedPolicy;

/// Load all `.kdl` policy files from the given directory and compile them
/// into a single immutable `PolicyRegistry`.
pub fn load_policies(dir: &Path) -> Result<PolicyRegistry, AuthzError> {
    if !dir.is_dir() {
        return Err(AuthzError::InvalidPolicy(format!(
            "policies directory `{}` does not exist or is not a directory",
            dir.display()
        )));
    }

    let mut all_parsed = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "kdl")
                .unwrap_or(false)
        })
        .collect();
    entries.sort_by_key(|e| e.path());

    for entry in &entries {
        let path = entry.path();
        let contents =
            std::fs::read_to_string(&path).map_err(|source| AuthzError::PolicyLoadError {
                path: path.display().to_string(),
                source,
            })?;
        all_parsed.push(parse_kdl_document(&contents)?);
    }

    let registry = compile_policies(all_parsed)?;

    tracing::info!(
        files = entries.len(),
        policies = registry.len(),
        "Loaded authorization policies"
    );

    Ok(registry)
}

/// Merge parsed files into one registry. Names must be unique across files.
pub fn compile_policies(parsed: Vec<ParsedPolicy>) -> Result<PolicyRegistry, AuthzError> {
    PolicyRegistry::from_policies(parsed.into_iter().flat_map(|p| p.policies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::types::{Policy, Requirement};

    #[test]
    fn test_compile_merges_files() {
        let p1 = ParsedPolicy {
            policies: vec![Policy::new("Admin", vec![Requirement::HasRole("Admin".into())])],
        };
        let p2 = ParsedPolicy {
            policies: vec![Policy::new("Open", vec![])],
        };
        let registry = compile_policies(vec![p1, p2]).unwrap();
        assert_eq!(registry.names(), vec!["Admin", "Open"]);
    }

    #[test]
    fn test_compile_rejects_duplicates_across_files() {
        let p1 = ParsedPolicy {
            policies: vec![Policy::new("Admin", vec![])],
        };
        let p2 = ParsedPolicy {
            policies: vec![Policy::new("Admin", vec![Requirement::Authenticated])],
        };
        let err = compile_policies(vec![p1, p2]).unwrap_err();
        assert!(matches!(err, AuthzError::DuplicatePolicy(_)));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();

        std::fs::write(
            dir.path().join("claims.kdl"),
            r#"
policy "Claim.DoB" {
    claim "date_of_birth"
}
"#,
        )
        .unwrap();

        std::fs::write(
            dir.path().join("roles.kdl"),
            r#"
policy "Admin" {
    role "Admin"
}
"#,
        )
        .unwrap();

        // Also write a non-KDL file that should be ignored
        std::fs::write(dir.path().join("README.md"), "not a policy").unwrap();

        let registry = load_policies(dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("Claim.DoB").is_some());
        assert!(registry.get("Admin").is_some());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.kdl"), "policy \"Open\" {").unwrap();
        let err = load_policies(dir.path()).unwrap_err();
        assert!(matches!(err, AuthzError::KdlParse(_)));
    }

    #[test]
    fn test_load_nonexistent_directory() {
        let err = load_policies(Path::new("/nonexistent/path")).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidPolicy(_)));
    }
}
