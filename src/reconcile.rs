//! Environment-driven reconciliation of the config document.
//!
//! Each rule reads only its own environment variables and edits only its own
//! subtree. Rules add or correct fields; they never remove anything, and a
//! field that already holds the desired value is left alone.

mod auth;
mod channels;
mod gateway;
mod models;
mod tunables;
mod workspace;

use crate::document;
use crate::env::Env;
use crate::error::Result;
use crate::providers::{PROVIDERS, available_providers};

use serde_json::Value;

/// The rule domains, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Workspace,
    AuthProfiles,
    Models,
    Tunables,
    Gateway,
    Channels,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Workspace => write!(f, "workspace"),
            Rule::AuthProfiles => write!(f, "auth-profiles"),
            Rule::Models => write!(f, "models"),
            Rule::Tunables => write!(f, "tunables"),
            Rule::Gateway => write!(f, "gateway"),
            Rule::Channels => write!(f, "channels"),
        }
    }
}

/// One field a rule actually changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub rule: Rule,
    /// Dotted path of the field, e.g. `agents.defaults.model.primary`.
    pub path: String,
}

/// Fields changed during one pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    changes: Vec<Change>,
}

impl ReconcileReport {
    /// Whether any field changed.
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    /// Set `path` to `value` and record the change if the value differed.
    fn set(
        &mut self,
        document: &mut Value,
        rule: Rule,
        path: &[&str],
        value: Value,
    ) -> Result<bool> {
        let changed = document::set(document, path, value)?;
        if changed {
            let path = document::dotted(path);
            tracing::debug!(%rule, %path, "config field updated");
            self.changes.push(Change { rule, path });
        }
        Ok(changed)
    }
}

/// Apply every rule to `document` using the known provider table.
///
/// The document is edited in place. An error from any rule aborts the pass;
/// the caller is expected to discard the document in that case.
pub fn reconcile(document: &mut Value, env: &Env) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();
    let available = available_providers(PROVIDERS, env);

    tracing::debug!(
        providers = ?available.iter().map(|spec| spec.name).collect::<Vec<_>>(),
        "available providers"
    );

    workspace::apply(document, env, &mut report)?;
    auth::apply(document, &available, &mut report)?;
    models::apply(document, &available, &mut report)?;
    tunables::apply(document, env, &mut report)?;
    gateway::apply(document, env, &mut report)?;
    channels::apply(document, env, &mut report)?;

    Ok(report)
}
