//! Startup reconciler for the OpenClaw config file.
//!
//! Runs once before the gateway starts: loads the persisted JSON config,
//! folds environment-supplied credentials and tunables into it, and writes
//! it back only if something changed. A failed pass is logged and otherwise
//! ignored so it can never block startup.

pub mod config;
pub mod document;
pub mod env;
pub mod error;
pub mod logging;
pub mod providers;
pub mod reconcile;
pub mod store;

pub use config::Config;
pub use env::Env;
pub use error::{Error, Result};
pub use reconcile::{Change, ReconcileReport, Rule, reconcile};
pub use store::ConfigStore;

/// Result of one reconciliation pass.
#[derive(Debug)]
pub enum Outcome {
    /// The document already matched the environment; nothing was written.
    Unchanged,
    /// The document was rewritten with these changes.
    Written { changes: Vec<Change> },
    /// Dry run: the changes that would be made and the resulting document.
    DryRun {
        changes: Vec<Change>,
        rendered: String,
    },
    /// The pass failed and was abandoned. The file on disk is untouched.
    Failed { error: String },
}

/// Run one reconciliation pass against the file named by `config`.
///
/// Never fails: any error is logged as a warning and reported as
/// [`Outcome::Failed`].
pub fn run(config: &Config, env: &Env) -> Outcome {
    match try_run(config, env) {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::warn!(
                path = %config.config_path.display(),
                %error,
                "config reconciliation failed, continuing with existing config"
            );
            Outcome::Failed {
                error: error.to_string(),
            }
        }
    }
}

fn try_run(config: &Config, env: &Env) -> Result<Outcome> {
    let store = if config.dry_run {
        ConfigStore::read_only(&config.config_path)
    } else {
        ConfigStore::new(&config.config_path)
    };

    let (mut document, snapshot) = store.load()?;
    let report = reconcile(&mut document, env)?;

    if config.dry_run {
        let rendered = store::render(&document)?;
        tracing::info!(
            path = %store.path().display(),
            changes = report.changes().len(),
            "dry run, config not written"
        );
        return Ok(Outcome::DryRun {
            changes: report.into_changes(),
            rendered,
        });
    }

    if store.save(&document, &snapshot)? {
        tracing::info!(
            path = %store.path().display(),
            changes = report.changes().len(),
            recovered_from_corrupt = snapshot.recovered_from_corrupt(),
            "config updated"
        );
        Ok(Outcome::Written {
            changes: report.into_changes(),
        })
    } else {
        tracing::info!(path = %store.path().display(), "config already up to date");
        Ok(Outcome::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::path::Path;

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    fn env_for(dir: &Path, pairs: &[(&str, &str)]) -> Env {
        Env::from_pairs(pairs.iter().copied())
            .with_override(config::STATE_DIR_VAR, dir.to_string_lossy())
    }

    #[test]
    fn missing_file_is_created_and_populated_in_one_pass() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_for(
            dir.path(),
            &[("ANTHROPIC_API_KEY", "sk-ant"), ("TELEGRAM_BOT_TOKEN", "tg")],
        );
        let config = Config::from_env(&env);

        let outcome = run(&config, &env);

        assert!(matches!(outcome, Outcome::Written { .. }));
        let written = read_json(&dir.path().join("openclaw.json"));
        assert_eq!(
            written["agents"]["defaults"]["model"]["primary"],
            json!("anthropic/claude-sonnet-4-5")
        );
        assert_eq!(
            written["agents"]["defaults"]["workspace"],
            json!(dir.path().join("workspace").to_string_lossy())
        );
        assert_eq!(written["channels"]["telegram"]["enabled"], json!(true));
        assert!(
            std::fs::read_to_string(dir.path().join("openclaw.json"))
                .unwrap()
                .ends_with("}\n")
        );
    }

    #[test]
    fn rerun_with_same_environment_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_for(dir.path(), &[("OPENAI_API_KEY", "o"), ("ANTHROPIC_API_KEY", "a")]);
        let config = Config::from_env(&env);
        std::fs::write(
            &config.config_path,
            r#"{"agents": {"defaults": {"model": {"primary": "openai/gpt-5.2"}}}}"#,
        )
        .unwrap();

        assert!(matches!(run(&config, &env), Outcome::Written { .. }));
        let first = std::fs::read_to_string(&config.config_path).unwrap();
        assert_eq!(
            read_json(&config.config_path)["agents"]["defaults"]["model"]["fallbacks"],
            json!(["anthropic/claude-sonnet-4-5", "anthropic/claude-haiku-4-5"])
        );

        assert!(matches!(run(&config, &env), Outcome::Unchanged));
        assert_eq!(std::fs::read_to_string(&config.config_path).unwrap(), first);
    }

    #[test]
    fn dry_run_reports_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_for(dir.path(), &[("OPENCLAW_GATEWAY_TOKEN", "gw")]);
        let config = Config::from_env(&env).with_dry_run(true);

        let (changes, rendered) = match run(&config, &env) {
            Outcome::DryRun { changes, rendered } => (changes, rendered),
            other => panic!("expected dry run outcome, got {other:?}"),
        };
        assert!(changes.iter().any(|change| change.path == "gateway.auth.token"));
        assert!(rendered.contains("\"token\": \"gw\""));
        assert!(!config.config_path.exists());
    }

    #[test]
    fn failure_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_for(dir.path(), &[("OPENCLAW_MAX_CONCURRENT", "lots")]);
        let config = Config::from_env(&env);
        std::fs::write(&config.config_path, "{\"meta\": {}}").unwrap();

        let error = match run(&config, &env) {
            Outcome::Failed { error } => error,
            other => panic!("expected failure, got {other:?}"),
        };
        assert!(error.contains("OPENCLAW_MAX_CONCURRENT"));
        assert_eq!(
            std::fs::read_to_string(&config.config_path).unwrap(),
            "{\"meta\": {}}"
        );
    }

    #[test]
    fn operator_fields_are_preserved_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_for(dir.path(), &[("TELEGRAM_BOT_TOKEN", "tg")]);
        let config = Config::from_env(&env);
        std::fs::write(
            &config.config_path,
            r#"{"meta":{"lastTouchedVersion":"2026.1.30","note":"→"},"tools":{"deny":["exec"]}}"#,
        )
        .unwrap();

        run(&config, &env);

        let written = std::fs::read_to_string(&config.config_path).unwrap();
        assert!(written.starts_with(indoc::indoc! {r#"
            {
              "meta": {
                "lastTouchedVersion": "2026.1.30",
                "note": "→"
              },
              "tools": {
                "deny": [
                  "exec"
                ]
              },
        "#}));
    }
}
