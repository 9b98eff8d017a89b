//! Agent runtime tunables driven by `OPENCLAW_*` variables.

use super::{ReconcileReport, Rule};
use crate::document;
use crate::env::Env;
use crate::error::{EnvError, Result};

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TunableKind {
    /// Stored verbatim as a JSON string.
    Text,
    /// Positive integer, compared numerically against the stored value.
    Count,
}

#[derive(Debug)]
struct Tunable {
    env_var: &'static str,
    path: &'static [&'static str],
    kind: TunableKind,
}

const TUNABLES: &[Tunable] = &[
    Tunable {
        env_var: "OPENCLAW_THINKING_DEFAULT",
        path: &["agents", "defaults", "thinkingDefault"],
        kind: TunableKind::Text,
    },
    Tunable {
        env_var: "OPENCLAW_MAX_CONCURRENT",
        path: &["agents", "defaults", "maxConcurrent"],
        kind: TunableKind::Count,
    },
    Tunable {
        env_var: "OPENCLAW_CONTEXT_PRUNING_MODE",
        path: &["agents", "defaults", "contextPruning", "mode"],
        kind: TunableKind::Text,
    },
    Tunable {
        env_var: "OPENCLAW_CONTEXT_PRUNING_TTL",
        path: &["agents", "defaults", "contextPruning", "ttl"],
        kind: TunableKind::Text,
    },
    Tunable {
        env_var: "OPENCLAW_COMPACTION_MODE",
        path: &["agents", "defaults", "compaction", "mode"],
        kind: TunableKind::Text,
    },
    Tunable {
        env_var: "OPENCLAW_HEARTBEAT_EVERY",
        path: &["agents", "defaults", "heartbeat", "every"],
        kind: TunableKind::Text,
    },
];

/// Copy each set tunable into the document. Unset variables leave the
/// stored field alone.
pub(super) fn apply(document: &mut Value, env: &Env, report: &mut ReconcileReport) -> Result<()> {
    for tunable in TUNABLES {
        let Some(raw) = env.get(tunable.env_var) else {
            continue;
        };

        let desired = match tunable.kind {
            TunableKind::Text => Value::from(raw),
            TunableKind::Count => {
                let count = parse_count(tunable.env_var, raw)?;
                if stored_number(document::get(document, tunable.path)) == Some(count as f64) {
                    continue;
                }
                Value::from(count)
            }
        };

        report.set(document, Rule::Tunables, tunable.path, desired)?;
    }
    Ok(())
}

fn parse_count(key: &str, raw: &str) -> std::result::Result<u64, EnvError> {
    raw.parse::<u64>()
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| EnvError::Invalid {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a positive integer".to_string(),
        })
}

/// Numeric reading of a stored field; numeric strings count too.
fn stored_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(document: &mut Value, env: &Env) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();
        apply(document, env, &mut report)?;
        Ok(report)
    }

    #[test]
    fn set_variables_are_written() {
        let env = Env::from_pairs([
            ("OPENCLAW_THINKING_DEFAULT", "low"),
            ("OPENCLAW_MAX_CONCURRENT", "4"),
            ("OPENCLAW_CONTEXT_PRUNING_MODE", "cache-ttl"),
            ("OPENCLAW_CONTEXT_PRUNING_TTL", "1h"),
            ("OPENCLAW_COMPACTION_MODE", "safeguard"),
            ("OPENCLAW_HEARTBEAT_EVERY", "30m"),
        ]);
        let mut document = json!({});

        let report = run(&mut document, &env).unwrap();

        assert_eq!(report.changes().len(), 6);
        assert_eq!(
            document,
            json!({"agents": {"defaults": {
                "thinkingDefault": "low",
                "maxConcurrent": 4,
                "contextPruning": {"mode": "cache-ttl", "ttl": "1h"},
                "compaction": {"mode": "safeguard"},
                "heartbeat": {"every": "30m"}
            }}})
        );
    }

    #[test]
    fn unset_variables_leave_fields_alone() {
        let env = Env::from_pairs([("OPENCLAW_HEARTBEAT_EVERY", "")]);
        let mut document = json!({"agents": {"defaults": {
            "heartbeat": {"every": "1h"},
            "maxConcurrent": 2
        }}});
        let before = document.clone();

        let report = run(&mut document, &env).unwrap();

        assert!(!report.changed());
        assert_eq!(document, before);
    }

    #[test]
    fn counts_compare_numerically() {
        let env = Env::from_pairs([("OPENCLAW_MAX_CONCURRENT", "4")]);

        for stored in [json!(4), json!(4.0), json!("4")] {
            let mut document = json!({"agents": {"defaults": {"maxConcurrent": stored}}});
            let before = document.clone();

            let report = run(&mut document, &env).unwrap();

            assert!(!report.changed());
            assert_eq!(document, before);
        }
    }

    #[test]
    fn differing_count_is_replaced() {
        let env = Env::from_pairs([("OPENCLAW_MAX_CONCURRENT", "8")]);
        let mut document = json!({"agents": {"defaults": {"maxConcurrent": 4}}});

        run(&mut document, &env).unwrap();

        assert_eq!(document["agents"]["defaults"]["maxConcurrent"], json!(8));
    }

    #[test]
    fn invalid_count_is_an_error() {
        for raw in ["four", "0", "-2", "1.5"] {
            let env = Env::from_pairs([("OPENCLAW_MAX_CONCURRENT", raw)]);
            let mut document = json!({});

            let error = run(&mut document, &env).unwrap_err();

            assert!(error.to_string().contains("OPENCLAW_MAX_CONCURRENT"));
            assert!(document.get("agents").is_none());
        }
    }
}
