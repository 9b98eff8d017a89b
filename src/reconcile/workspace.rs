//! Agent workspace location.

use super::{ReconcileReport, Rule};
use crate::config;
use crate::env::Env;
use crate::error::Result;

use serde_json::Value;

const WORKSPACE_PATH: &[&str] = &["agents", "defaults", "workspace"];

/// Point `agents.defaults.workspace` at `WORKSPACE_DIR`, or at
/// `<state dir>/workspace` when that is unset.
pub(super) fn apply(document: &mut Value, env: &Env, report: &mut ReconcileReport) -> Result<()> {
    let desired = config::workspace_dir(env).to_string_lossy().into_owned();
    report.set(document, Rule::Workspace, WORKSPACE_PATH, Value::String(desired))?;
    Ok(())
}
