pub mod manifest;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ScanSettings;
use crate::error::{Result, TrustError};
use crate::registry::host;

/// Permissions declared by one extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub name: String,
    pub version: String,
    pub manifest_version: u8,
    /// Manifest the record was read from, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// API permissions.
    pub permissions: Vec<String>,
    /// Host match patterns, including content script matches.
    pub host_permissions: Vec<String>,
    /// Optional API and host permissions (granted at runtime, if at all).
    pub optional_permissions: Vec<String>,
}

impl ExtensionRecord {
    /// A record built from a bare permission list.
    pub fn from_permissions(name: impl Into<String>, permissions: Vec<String>) -> Self {
        let (hosts, apis): (Vec<String>, Vec<String>) = permissions
            .into_iter()
            .partition(|p| host::is_host_pattern(p));
        Self {
            name: name.into(),
            version: "-".into(),
            manifest_version: 3,
            path: None,
            permissions: apis,
            host_permissions: hosts,
            optional_permissions: Vec::new(),
        }
    }

    /// The permission list handed to the engine under the given settings.
    pub fn effective_permissions(&self, settings: &ScanSettings) -> Vec<String> {
        let mut all = self.permissions.clone();
        if settings.include_host_permissions {
            all.extend(self.host_permissions.iter().cloned());
        }
        if settings.include_optional_permissions {
            all.extend(self.optional_permissions.iter().cloned());
        }
        all
    }
}

/// Supplies the permission lists to score. The engine never enumerates
/// extensions itself.
pub trait PermissionSource {
    /// Short description for logs and reports.
    fn describe(&self) -> String;

    /// Load every extension this source knows about.
    fn load(&self) -> Result<Vec<ExtensionRecord>>;
}

/// Records supplied directly by the caller.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<ExtensionRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<ExtensionRecord>) -> Self {
        Self { records }
    }
}

impl PermissionSource for StaticSource {
    fn describe(&self) -> String {
        format!("{} supplied record(s)", self.records.len())
    }

    fn load(&self) -> Result<Vec<ExtensionRecord>> {
        Ok(self.records.clone())
    }
}

/// Every `manifest.json` below a directory (or a single manifest file).
#[derive(Debug, Clone)]
pub struct ManifestDirSource {
    root: PathBuf,
}

impl ManifestDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PermissionSource for ManifestDirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn load(&self) -> Result<Vec<ExtensionRecord>> {
        discover(&self.root)
    }
}

/// Find and parse extension manifests below `root`.
///
/// Honors `.gitignore`, skips hidden directories and `node_modules`, and
/// descends at most six levels. Manifests that fail to parse are logged and
/// skipped, as are paths the walker cannot read; finding none at all is an
/// error.
pub fn discover(root: &Path) -> Result<Vec<ExtensionRecord>> {
    if root.is_file() {
        return Ok(vec![manifest::parse_manifest_file(root)?]);
    }

    let walker = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .max_depth(Some(6))
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .build();

    let mut records = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "skipping unreadable path");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || path.file_name().and_then(|n| n.to_str()) != Some("manifest.json") {
            continue;
        }
        match manifest::parse_manifest_file(path) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping manifest");
            }
        }
    }

    if records.is_empty() {
        return Err(TrustError::NoManifests(root.display().to_string()));
    }

    records.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(records)
}
