//! Gateway token authentication.

use super::{ReconcileReport, Rule};
use crate::env::Env;
use crate::error::Result;

use serde_json::Value;

const GATEWAY_TOKEN_VAR: &str = "OPENCLAW_GATEWAY_TOKEN";

const MODE_PATH: &[&str] = &["gateway", "auth", "mode"];
const TOKEN_PATH: &[&str] = &["gateway", "auth", "token"];

/// With a gateway token in the environment, make `gateway.auth` use it in
/// token mode. Other keys under `gateway.auth` are kept.
pub(super) fn apply(document: &mut Value, env: &Env, report: &mut ReconcileReport) -> Result<()> {
    let Some(token) = env.get(GATEWAY_TOKEN_VAR) else {
        return Ok(());
    };

    report.set(document, Rule::Gateway, MODE_PATH, Value::from("token"))?;
    report.set(document, Rule::Gateway, TOKEN_PATH, Value::from(token))?;
    Ok(())
}
