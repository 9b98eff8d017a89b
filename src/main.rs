//! openclaw-reconcile CLI entry point.
//!
//! Always exits 0: the container entrypoint runs this before starting the
//! gateway and must never be blocked by it.

use clap::Parser;
use openclaw_reconcile::{Config, Env, Outcome, config, logging};

use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "openclaw-reconcile")]
#[command(about = "Fold environment credentials and tunables into the OpenClaw config")]
struct Cli {
    /// Path to the config file (overrides OPENCLAW_CONFIG_PATH)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// State directory (overrides OPENCLAW_STATE_DIR)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Print the reconciled document instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // Covers --help and --version as well as bad arguments.
            let _ = error.print();
            return ExitCode::SUCCESS;
        }
    };

    logging::init(cli.debug);

    let mut env = Env::from_process();
    if let Some(state_dir) = &cli.state_dir {
        env = env.with_override(config::STATE_DIR_VAR, state_dir.to_string_lossy());
    }

    let mut config = Config::from_env(&env).with_dry_run(cli.dry_run);
    if let Some(path) = cli.config {
        config = config.with_config_path(path);
    }

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        openclaw_reconcile::run(&config, &env)
    }))
    .unwrap_or_else(|_| {
        tracing::warn!("config reconciliation panicked, continuing with existing config");
        Outcome::Failed {
            error: "panic during reconciliation".into(),
        }
    });

    match outcome {
        Outcome::DryRun { changes, rendered } => {
            for change in &changes {
                tracing::info!(rule = %change.rule, path = %change.path, "would change");
            }
            print!("{rendered}");
        }
        Outcome::Written { changes } => {
            for change in &changes {
                tracing::info!(rule = %change.rule, path = %change.path, "changed");
            }
        }
        Outcome::Unchanged | Outcome::Failed { .. } => {}
    }

    ExitCode::SUCCESS
}
