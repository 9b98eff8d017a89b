//! JSON config file loading and persistence.

use crate::document;
use crate::error::{Result, StoreError};

use anyhow::Context as _;
use serde_json::{Map, Value};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What the document looked like when it was loaded.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Canonical rendering of the loaded document. A pass writes iff the
    /// final rendering differs from this.
    rendered: String,

    /// Raw bytes of a file that could not be used as a config document.
    /// Kept so they can be backed up before the file is overwritten.
    corrupt_original: Option<Vec<u8>>,
}

impl Snapshot {
    /// Whether `rendered` differs from the document as loaded.
    pub fn differs_from(&self, rendered: &str) -> bool {
        self.rendered != rendered
    }

    /// Whether the file on disk was malformed and replaced by an empty document.
    pub(crate) fn recovered_from_corrupt(&self) -> bool {
        self.corrupt_original.is_some()
    }
}

/// Loads and conditionally rewrites the config document at one path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    create_missing: bool,
}

impl ConfigStore {
    /// Store that creates the file (and its directory) on first load.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_missing: true,
        }
    }

    /// Store that never touches the filesystem on load.
    pub fn read_only(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_missing: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document.
    ///
    /// A missing file yields an empty object (and is created as `{}` unless
    /// the store is read-only). An unreadable file also yields an empty
    /// object. A file that is not valid JSON, or whose root is not an object,
    /// yields an empty object too; the failure is logged and the original
    /// bytes are remembered in the snapshot.
    pub fn load(&self) -> Result<(Value, Snapshot)> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return self.create_empty();
            }
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "config is unreadable, starting from an empty document"
                );
                let document = empty_document();
                let rendered = render(&document)?;
                return Ok((
                    document,
                    Snapshot {
                        rendered,
                        corrupt_original: None,
                    },
                ));
            }
        };

        let (document, corrupt_original) = match serde_json::from_slice::<Value>(&bytes) {
            Ok(document @ Value::Object(_)) => (document, None),
            Ok(other) => {
                tracing::warn!(
                    path = %self.path.display(),
                    found = document::type_name(&other),
                    "config root is not an object, starting from an empty document"
                );
                (empty_document(), Some(bytes))
            }
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "config is not valid JSON, starting from an empty document"
                );
                (empty_document(), Some(bytes))
            }
        };

        let rendered = render(&document)?;
        Ok((
            document,
            Snapshot {
                rendered,
                corrupt_original,
            },
        ))
    }

    fn create_empty(&self) -> Result<(Value, Snapshot)> {
        let document = empty_document();
        let rendered = render(&document)?;

        if self.create_missing {
            self.ensure_parent_dir()?;
            std::fs::write(&self.path, &rendered).map_err(|error| StoreError::Write {
                path: self.path.display().to_string(),
                source: Arc::new(error),
            })?;
            tracing::info!(path = %self.path.display(), "created empty config");
        } else {
            tracing::debug!(path = %self.path.display(), "config does not exist");
        }

        Ok((
            document,
            Snapshot {
                rendered,
                corrupt_original: None,
            },
        ))
    }

    /// Write `document` if its rendering differs from `snapshot`. Returns
    /// whether a write happened.
    ///
    /// The write goes through a temporary sibling file and a rename. When the
    /// loaded file was corrupt its original bytes are copied to
    /// `<file>.corrupt-<timestamp>` first.
    pub fn save(&self, document: &Value, snapshot: &Snapshot) -> Result<bool> {
        let rendered = render(document)?;
        if !snapshot.differs_from(&rendered) {
            return Ok(false);
        }

        self.ensure_parent_dir()?;

        if let Some(original) = &snapshot.corrupt_original {
            let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
            let backup = sibling_path(&self.path, &format!(".corrupt-{stamp}"));
            std::fs::write(&backup, original).with_context(|| {
                format!("failed to back up corrupt config to {}", backup.display())
            })?;
            tracing::warn!(backup = %backup.display(), "backed up corrupt config before rewriting");
        }

        let tmp = sibling_path(&self.path, ".tmp");
        let write_error = |error: std::io::Error| StoreError::Write {
            path: self.path.display().to_string(),
            source: Arc::new(error),
        };
        std::fs::write(&tmp, &rendered).map_err(write_error)?;
        if let Err(error) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(write_error(error).into());
        }

        tracing::debug!(path = %self.path.display(), bytes = rendered.len(), "config written");
        Ok(true)
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };
        std::fs::create_dir_all(parent).map_err(|error| StoreError::CreateDir {
            path: parent.display().to_string(),
            source: Arc::new(error),
        })?;
        Ok(())
    }
}

/// Serialize with two-space indentation and a trailing newline.
pub fn render(document: &Value) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(document).map_err(StoreError::from)?;
    rendered.push('\n');
    Ok(rendered)
}

fn empty_document() -> Value {
    Value::Object(Map::new())
}

/// `path` with `suffix` appended to its file name.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("config"));
    name.push(suffix);
    path.with_file_name(name)
}
