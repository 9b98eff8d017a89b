//! Primary model and fallback chain under `agents.defaults.model`.
//!
//! The primary is only replaced when it is missing or names a provider whose
//! credential is gone; an operator's choice of a live provider always stands.
//! Fallbacks are filtered down to live providers other than the primary's,
//! then every available provider not yet represented gets its recommended
//! models appended in priority order. Existing entries keep their relative
//! order, so repeated passes with the same inputs settle immediately.

use super::{ReconcileReport, Rule};
use crate::document;
use crate::error::Result;
use crate::providers::{ProviderSpec, provider_from_model};

use serde_json::Value;
use std::collections::HashSet;

const MODEL_PATH: &[&str] = &["agents", "defaults", "model"];
const PRIMARY_PATH: &[&str] = &["agents", "defaults", "model", "primary"];
const FALLBACKS_PATH: &[&str] = &["agents", "defaults", "model", "fallbacks"];

/// Model selection as currently stored. `agents.defaults.model` may be the
/// string shorthand `"provider/model"`, which only names a primary.
struct StoredSelection {
    primary: Option<String>,
    fallbacks: Option<Value>,
    shorthand: bool,
}

impl StoredSelection {
    fn read(document: &Value) -> Self {
        match document::get(document, MODEL_PATH) {
            Some(Value::String(primary)) => Self {
                primary: Some(primary.clone()),
                fallbacks: None,
                shorthand: true,
            },
            Some(model) => Self {
                primary: model.get("primary").and_then(Value::as_str).map(String::from),
                fallbacks: model.get("fallbacks").cloned(),
                shorthand: false,
            },
            None => Self {
                primary: None,
                fallbacks: None,
                shorthand: false,
            },
        }
    }
}

pub(super) fn apply(
    document: &mut Value,
    available: &[&ProviderSpec],
    report: &mut ReconcileReport,
) -> Result<()> {
    let stored = StoredSelection::read(document);

    let Some(primary) = select_primary(stored.primary.as_deref(), available) else {
        tracing::debug!("no provider credentials present, leaving model selection alone");
        return Ok(());
    };
    let fallbacks = merge_fallbacks(&primary, stored.fallbacks.as_ref(), available);
    let fallbacks = Value::Array(fallbacks.into_iter().map(Value::String).collect());

    if stored.shorthand {
        let mut model = serde_json::Map::new();
        model.insert("primary".into(), Value::String(primary));
        model.insert("fallbacks".into(), fallbacks);
        report.set(document, Rule::Models, MODEL_PATH, Value::Object(model))?;
        return Ok(());
    }

    report.set(document, Rule::Models, PRIMARY_PATH, Value::String(primary))?;
    report.set(document, Rule::Models, FALLBACKS_PATH, fallbacks)?;
    Ok(())
}

/// Keep `current` verbatim if its provider is available, otherwise take the
/// first available provider's primary model. `None` when nothing is available.
fn select_primary(current: Option<&str>, available: &[&ProviderSpec]) -> Option<String> {
    let current = current.filter(|primary| !primary.is_empty());
    if let Some(primary) = current
        && is_available(available, primary)
    {
        return Some(primary.to_string());
    }
    available.first().map(|spec| spec.primary_model.to_string())
}

/// Merge an existing fallback list with the recommended models of the
/// available providers.
///
/// Existing entries survive when they are strings, are not `primary`, and
/// belong to an available provider other than the primary's. Providers not
/// represented among the survivors contribute their primary model and
/// fallbacks, appended in provider priority order. The result has no
/// duplicates.
fn merge_fallbacks(
    primary: &str,
    existing: Option<&Value>,
    available: &[&ProviderSpec],
) -> Vec<String> {
    let active = provider_from_model(primary);

    let recommended = dedup_keep_order(
        available
            .iter()
            .filter(|spec| spec.name != active)
            .flat_map(|spec| {
                std::iter::once(spec.primary_model).chain(spec.fallback_models.iter().copied())
            })
            .filter(|model| provider_from_model(model) != active)
            .map(String::from)
            .collect(),
    );

    let kept = dedup_keep_order(
        existing
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .filter(|model| {
                *model != primary
                    && provider_from_model(model) != active
                    && is_available(available, model)
            })
            .map(String::from)
            .collect(),
    );

    let represented: HashSet<&str> = kept.iter().map(|model| provider_from_model(model)).collect();
    let missing = recommended
        .iter()
        .filter(|model| !represented.contains(provider_from_model(model)))
        .cloned();

    dedup_keep_order(kept.iter().cloned().chain(missing).collect())
}

fn is_available(available: &[&ProviderSpec], model: &str) -> bool {
    let provider = provider_from_model(model);
    available.iter().any(|spec| spec.name == provider)
}

fn dedup_keep_order(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}
