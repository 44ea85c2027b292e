//! Access scoping: which key prefixes a principal may operate on.
//!
//! A secret key is namespaced as `project/environment/name`, with the
//! sentinel `global` project for secrets shared across projects. The scope
//! is computed per request from the principal's administered projects and is
//! never persisted. Computing the scope is this module's whole job;
//! enforcing it against a concrete operation stays with the caller.

use std::collections::HashSet;

/// Sentinel prefix granting access to cross-project secrets.
pub const GLOBAL_SCOPE: &str = "global";

/// The identity a secret operation runs as.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: i64,
    /// Administrator privilege grants the `global` prefix.
    pub admin: bool,
    /// Permalinks of the projects this principal administers.
    pub administered_projects: Vec<String>,
}

/// The set of key prefixes a principal may operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessScope {
    prefixes: Vec<String>,
}

impl AccessScope {
    /// Compute the scope for a principal: their administered-project
    /// permalinks, with `global` prepended (first element) for admins.
    pub fn for_principal(principal: &Principal) -> Self {
        let mut prefixes = Vec::with_capacity(principal.administered_projects.len() + 1);
        if principal.admin {
            prefixes.push(GLOBAL_SCOPE.to_string());
        }
        prefixes.extend(principal.administered_projects.iter().cloned());
        Self { prefixes }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn into_prefixes(self) -> Vec<String> {
        self.prefixes
    }

    /// Whether a key falls under one of the scope's prefixes.
    pub fn permits(&self, key: &str) -> bool {
        self.prefixes.iter().any(|prefix| {
            key.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// A deploy group as supplied by the (external) deploy-group core. Only the
/// fields needed for the same-scope rule are modeled here.
#[derive(Debug, Clone)]
pub struct DeployGroup {
    pub permalink: String,
    pub environment_id: i64,
    pub production: bool,
}

/// Vault-server association rule: the groups already attached to a vault
/// server plus the candidate must all share one environment, or every one of
/// them must be flagged production. Called by the deploy-group layer before
/// it associates a vault server with `candidate`.
pub fn validate_same_scope(existing: &[DeployGroup], candidate: &DeployGroup) -> bool {
    let environments: HashSet<i64> = existing
        .iter()
        .chain(std::iter::once(candidate))
        .map(|group| group.environment_id)
        .collect();

    if environments.len() <= 1 {
        return true;
    }

    existing.iter().chain(std::iter::once(candidate)).all(|group| group.production)
}
