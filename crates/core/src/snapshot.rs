//! Library snapshots and their on-disk store.

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{ActivityEvent, Item, Member, MemberId};

/// Directory under the user data directory used for snapshots.
pub const DEFAULT_SNAPSHOT_DIR: &str = "biblio/snapshots";

/// One active loan in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanEntry {
    /// Item on loan.
    pub item_id: String,
    /// Member holding it.
    pub member_id: MemberId,
}

/// Full library state, ready to be serialised.
///
/// Items, members and loans appear in the order the library holds them.
/// Members carry their borrowed lists, which must agree with `active_loans`
/// for the snapshot to be restorable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    /// Library display name.
    pub name: String,
    /// Catalogued items.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Registered members.
    #[serde(default)]
    pub members: Vec<Member>,
    /// Active loans, oldest first.
    #[serde(default)]
    pub active_loans: Vec<LoanEntry>,
    /// Activity log, oldest first.
    #[serde(default)]
    pub history: Vec<ActivityEvent>,
}

/// Metadata describing a persisted snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Absolute path to the snapshot file.
    pub path: PathBuf,
    /// Human readable label.
    pub label: String,
    /// Library name stored in the snapshot.
    pub library: String,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    label: String,
    saved_at: DateTime<Utc>,
    snapshot: LibrarySnapshot,
}

impl SnapshotFile {
    fn entry(&self, path: PathBuf) -> SnapshotEntry {
        SnapshotEntry {
            path,
            label: self.label.clone(),
            library: self.snapshot.name.clone(),
            saved_at: self.saved_at,
        }
    }
}

/// Reads and writes snapshot files in a single directory.
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default location under the user's data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_SNAPSHOT_DIR)
    }

    /// Directory this store reads and writes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All readable snapshots, most recent first.
    pub fn entries(&self) -> Result<Vec<SnapshotEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root).context("failed to read snapshot directory")? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if entry.path().extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            match read_file(&entry.path()) {
                Ok(file) => entries.push(file.entry(entry.path())),
                Err(err) => {
                    warn!(path = %entry.path().display(), "Skipping unreadable snapshot: {err:#}");
                }
            }
        }

        entries.sort_by(|a, b| {
            b.saved_at
                .cmp(&a.saved_at)
                .then_with(|| b.path.as_os_str().len().cmp(&a.path.as_os_str().len()))
                .then_with(|| b.path.cmp(&a.path))
        });
        Ok(entries)
    }

    /// Write a snapshot to a new file and return its entry.
    ///
    /// The label defaults to the library name. Existing files are never
    /// replaced: a name that is already taken gets a `-1`, `-2`, ... suffix.
    pub fn save(&self, snapshot: &LibrarySnapshot, label: Option<&str>) -> Result<SnapshotEntry> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let label = label
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| snapshot.name.clone());
        let file = SnapshotFile {
            label,
            saved_at: Utc::now(),
            snapshot: snapshot.clone(),
        };
        let stem = format!(
            "{}_{}",
            sanitize_component(&file.label),
            file.saved_at.format("%Y%m%d%H%M%S%3f")
        );
        let serialised =
            serde_json::to_vec_pretty(&file).context("failed to serialise snapshot")?;
        let path = self.write_new(&stem, &serialised)?;

        info!(
            path = %path.display(),
            items = snapshot.items.len(),
            loans = snapshot.active_loans.len(),
            "Snapshot written"
        );
        Ok(file.entry(path))
    }

    /// Read the snapshot behind an entry.
    pub fn load(&self, entry: &SnapshotEntry) -> Result<LibrarySnapshot> {
        Ok(read_file(&entry.path)?.snapshot)
    }

    /// Most recent snapshot entry, if any.
    pub fn latest(&self) -> Result<Option<SnapshotEntry>> {
        Ok(self.entries()?.into_iter().next())
    }

    fn write_new(&self, stem: &str, contents: &[u8]) -> Result<PathBuf> {
        let mut attempt = 0u32;
        loop {
            let file_name = match attempt {
                0 => format!("{stem}.json"),
                n => format!("{stem}-{n}.json"),
            };
            let path = self.root.join(file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut handle) => {
                    handle
                        .write_all(contents)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    return Ok(path);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(err) => {
                    return Err(err).with_context(|| format!("failed to create {}", path.display()))
                }
            }
        }
    }
}

fn read_file(path: &Path) -> Result<SnapshotFile> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn sanitize_component(input: &str) -> String {
    let result: String = input
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
        .collect();
    if result.is_empty() {
        "snapshot".to_string()
    } else {
        result
    }
}
