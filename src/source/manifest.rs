//! `manifest.json` parsing for MV2 and MV3 extensions.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TrustError};
use crate::registry::host::{is_host_pattern, is_valid_match_pattern};

use super::ExtensionRecord;

/// The subset of the manifest that matters for permission scoring.
#[derive(Debug, Deserialize)]
struct RawManifest {
    manifest_version: u8,
    name: String,
    version: String,
    #[serde(default)]
    permissions: Vec<serde_json::Value>,
    #[serde(default)]
    optional_permissions: Vec<serde_json::Value>,
    #[serde(default)]
    host_permissions: Vec<serde_json::Value>,
    #[serde(default)]
    optional_host_permissions: Vec<serde_json::Value>,
    #[serde(default)]
    content_scripts: Vec<RawContentScript>,
}

#[derive(Debug, Deserialize)]
struct RawContentScript {
    #[serde(default)]
    matches: Vec<String>,
}

/// Parse manifest content. `origin` names the source in errors and logs.
///
/// Comments are tolerated. Non-string permission entries (object-form
/// permissions from legacy packaged apps) are skipped.
pub fn parse_manifest(content: &str, origin: &str) -> Result<ExtensionRecord> {
    let raw: RawManifest = json5::from_str(content).map_err(|e| TrustError::Manifest {
        file: origin.into(),
        message: e.to_string(),
    })?;

    if raw.manifest_version != 2 && raw.manifest_version != 3 {
        return Err(TrustError::Manifest {
            file: origin.into(),
            message: format!("unsupported manifest_version {}", raw.manifest_version),
        });
    }

    let mut record = ExtensionRecord {
        name: raw.name,
        version: raw.version,
        manifest_version: raw.manifest_version,
        path: None,
        permissions: Vec::new(),
        host_permissions: Vec::new(),
        optional_permissions: Vec::new(),
    };

    // MV2 mixes host patterns into `permissions`; MV3 keeps them apart.
    for entry in string_entries(&raw.permissions, origin) {
        if is_host_pattern(&entry) {
            push_host(&mut record.host_permissions, entry, origin);
        } else {
            record.permissions.push(entry);
        }
    }
    for entry in string_entries(&raw.host_permissions, origin) {
        push_host(&mut record.host_permissions, entry, origin);
    }
    for script in raw.content_scripts {
        for pattern in script.matches {
            push_host(&mut record.host_permissions, pattern, origin);
        }
    }
    record.optional_permissions = string_entries(&raw.optional_permissions, origin)
        .chain(string_entries(&raw.optional_host_permissions, origin))
        .collect();

    Ok(record)
}

/// Parse a manifest file from disk.
pub fn parse_manifest_file(path: &Path) -> Result<ExtensionRecord> {
    let content = std::fs::read_to_string(path)?;
    let mut record = parse_manifest(&content, &path.display().to_string())?;
    record.path = Some(path.to_path_buf());
    Ok(record)
}

fn string_entries<'a>(
    values: &'a [serde_json::Value],
    origin: &'a str,
) -> impl Iterator<Item = String> + 'a {
    values.iter().filter_map(move |value| match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            tracing::warn!(manifest = origin, entry = %value, "skipping non-string permission entry");
            None
        }
    })
}

fn push_host(hosts: &mut Vec<String>, pattern: String, origin: &str) {
    if !is_valid_match_pattern(&pattern) {
        tracing::warn!(manifest = origin, pattern = %pattern, "malformed host match pattern");
    }
    if !hosts.contains(&pattern) {
        hosts.push(pattern);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_mv3_manifest() {
        let record = parse_manifest(
            r#"{
                "manifest_version": 3,
                "name": "Tab Helper",
                "version": "1.2.0",
                "permissions": ["storage", "tabs"],
                "host_permissions": ["https://*/*"],
                "optional_permissions": ["downloads"]
            }"#,
            "test",
        )
        .unwrap();
        assert_eq!(record.name, "Tab Helper");
        assert_eq!(record.manifest_version, 3);
        assert_eq!(record.permissions, vec!["storage", "tabs"]);
        assert_eq!(record.host_permissions, vec!["https://*/*"]);
        assert_eq!(record.optional_permissions, vec!["downloads"]);
    }

    #[test]
    fn splits_mv2_host_permissions() {
        let record = parse_manifest(
            r#"{
                "manifest_version": 2,
                "name": "Legacy",
                "version": "0.9",
                "permissions": ["webRequest", "<all_urls>", "http://example.com/*"]
            }"#,
            "test",
        )
        .unwrap();
        assert_eq!(record.permissions, vec!["webRequest"]);
        assert_eq!(
            record.host_permissions,
            vec!["<all_urls>", "http://example.com/*"]
        );
    }

    #[test]
    fn content_script_matches_count_as_hosts() {
        let record = parse_manifest(
            r#"{
                "manifest_version": 3,
                "name": "Injector",
                "version": "1.0",
                "host_permissions": ["<all_urls>"],
                "content_scripts": [{"matches": ["<all_urls>", "https://mail.example.com/*"], "js": ["c.js"]}]
            }"#,
            "test",
        )
        .unwrap();
        assert_eq!(
            record.host_permissions,
            vec!["<all_urls>", "https://mail.example.com/*"]
        );
    }

    #[test]
    fn tolerates_comments_and_objects() {
        let record = parse_manifest(
            r#"{
                // packaged app leftovers
                "manifest_version": 2,
                "name": "Old App",
                "version": "3",
                "permissions": ["storage", {"fileSystem": ["write"]}]
            }"#,
            "test",
        )
        .unwrap();
        assert_eq!(record.permissions, vec!["storage"]);
    }

    #[test]
    fn rejects_unknown_manifest_version() {
        let err = parse_manifest(
            r#"{"manifest_version": 1, "name": "x", "version": "1"}"#,
            "test",
        );
        assert!(matches!(err, Err(TrustError::Manifest { .. })));
    }

    #[test]
    fn rejects_non_extension_json() {
        let err = parse_manifest(r#"{"short_name": "PWA", "start_url": "/"}"#, "test");
        assert!(err.is_err());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(
            &path,
            r#"{"manifest_version": 3, "name": "Disk", "version": "1", "permissions": ["alarms"]}"#,
        )
        .unwrap();
        let record = parse_manifest_file(&path).unwrap();
        assert_eq!(record.path.as_deref(), Some(path.as_path()));
        assert_eq!(record.permissions, vec!["alarms"]);
    }
}
