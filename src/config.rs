//! Runtime settings for the reconciler itself.

use crate::env::Env;

use std::path::PathBuf;

/// State directory used when `OPENCLAW_STATE_DIR` is unset.
pub const DEFAULT_STATE_DIR: &str = "/data";

/// File name of the persisted config inside the state directory.
pub const CONFIG_FILE_NAME: &str = "openclaw.json";

pub const STATE_DIR_VAR: &str = "OPENCLAW_STATE_DIR";
pub const CONFIG_PATH_VAR: &str = "OPENCLAW_CONFIG_PATH";
pub const WORKSPACE_DIR_VAR: &str = "WORKSPACE_DIR";

/// Reconciler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding persistent state (config file, default workspace).
    pub state_dir: PathBuf,

    /// Path of the JSON config document.
    pub config_path: PathBuf,

    /// Compute and report changes without touching the filesystem.
    pub dry_run: bool,
}

impl Config {
    /// Resolve settings from the environment.
    pub fn from_env(env: &Env) -> Self {
        let state_dir = state_dir(env);
        let config_path = env
            .get(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| state_dir.join(CONFIG_FILE_NAME));

        Self {
            state_dir,
            config_path,
            dry_run: false,
        }
    }

    /// Override the config file location.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// State directory from `OPENCLAW_STATE_DIR`, falling back to `/data`.
pub fn state_dir(env: &Env) -> PathBuf {
    env.get(STATE_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
}

/// Workspace directory from `WORKSPACE_DIR`, falling back to
/// `<state dir>/workspace`.
pub fn workspace_dir(env: &Env) -> PathBuf {
    env.get(WORKSPACE_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| state_dir(env).join("workspace"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_data_volume() {
        let config = Config::from_env(&Env::default());

        assert_eq!(config.state_dir, PathBuf::from("/data"));
        assert_eq!(config.config_path, PathBuf::from("/data/openclaw.json"));
        assert!(!config.dry_run);
    }

    #[test]
    fn config_path_follows_state_dir_unless_overridden() {
        let env = Env::from_pairs([(STATE_DIR_VAR, "/srv/claw")]);
        assert_eq!(
            Config::from_env(&env).config_path,
            PathBuf::from("/srv/claw/openclaw.json")
        );

        let env = env.with_override(CONFIG_PATH_VAR, "/etc/claw/custom.json");
        let config = Config::from_env(&env);
        assert_eq!(config.config_path, PathBuf::from("/etc/claw/custom.json"));
        assert_eq!(config.state_dir, PathBuf::from("/srv/claw"));
    }

    #[test]
    fn workspace_prefers_explicit_dir() {
        let env = Env::from_pairs([(STATE_DIR_VAR, "/srv/claw")]);
        assert_eq!(workspace_dir(&env), PathBuf::from("/srv/claw/workspace"));

        let env = env.with_override(WORKSPACE_DIR_VAR, "/home/agent/work");
        assert_eq!(workspace_dir(&env), PathBuf::from("/home/agent/work"));
    }
}
