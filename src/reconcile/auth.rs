//! Credential profiles under `auth.profiles`.

use super::{ReconcileReport, Rule};
use crate::error::Result;
use crate::providers::ProviderSpec;

use serde_json::Value;

/// Ensure every available provider has a token profile.
///
/// Only `mode` and `provider` are written, so extra keys an operator put in a
/// profile survive. Profiles of providers without a credential are left in
/// place for the operator to clean up.
pub(super) fn apply(
    document: &mut Value,
    available: &[&ProviderSpec],
    report: &mut ReconcileReport,
) -> Result<()> {
    for spec in available {
        report.set(
            document,
            Rule::AuthProfiles,
            &["auth", "profiles", spec.profile_key, "mode"],
            Value::from("token"),
        )?;
        report.set(
            document,
            Rule::AuthProfiles,
            &["auth", "profiles", spec.profile_key, "provider"],
            Value::from(spec.name),
        )?;
    }
    Ok(())
}
