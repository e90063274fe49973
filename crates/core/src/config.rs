//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{service::DEFAULT_LIBRARY_NAME, snapshot::SnapshotStore};

/// Folder under the user config directory holding `config.toml`.
pub const CONFIG_DIR: &str = "biblio";
/// Prefix for environment overrides, e.g. `BIBLIO_LIBRARY_NAME`.
pub const ENV_PREFIX: &str = "BIBLIO";

const DEFAULT_CONFIG: &str = r#"# Display name of the library.
library_name = "Biblioteca"

# Directory where snapshots are written. Leave unset for the platform default.
# data_dir = "/path/to/snapshots"

# Label prefix used for snapshot files. Defaults to the library name.
# snapshot_label = "daily"

# Write a snapshot when the program exits.
autosave = true
"#;

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display name of the library.
    pub library_name: String,
    /// Directory holding snapshot files.
    pub data_dir: PathBuf,
    /// Optional label for snapshot files.
    #[serde(default)]
    pub snapshot_label: Option<String>,
    /// Persist a snapshot on exit.
    pub autosave: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            data_dir: Self::default_data_dir(),
            snapshot_label: None,
            autosave: true,
        }
    }
}

impl AppConfig {
    /// Load from the user config file and `BIBLIO_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(Some(&Self::config_path()))
    }

    /// Load defaults, then the given file (if it exists), then the environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::load_layers(path, None)
    }

    /// `env` replaces the process environment when given; keys keep the
    /// `BIBLIO_` prefix.
    fn load_layers(
        path: Option<&Path>,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = ::config::Config::builder()
            .set_default("library_name", defaults.library_name)?
            .set_default(
                "data_dir",
                defaults.data_dir.to_string_lossy().into_owned(),
            )?
            .set_default("autosave", defaults.autosave)?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("failed to assemble configuration")?;
        settings
            .try_deserialize()
            .context("failed to deserialize configuration")
    }

    /// Location of the user config file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join("config.toml")
    }

    /// Default snapshot directory.
    pub fn default_data_dir() -> PathBuf {
        SnapshotStore::default_root()
    }

    /// Snapshot store rooted at the configured data directory.
    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.data_dir)
    }
}

/// Write the commented default config file unless one already exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = AppConfig::config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}
