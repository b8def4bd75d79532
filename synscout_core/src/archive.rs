/*============================================================
  Synavera Project: Syn-Scout
  Module: synscout_core::archive
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Merge a freshly scraped release into the persisted archive
    document, retiring the previous latest release into the
    version history, and read/write that document on disk.

  Security / Safety Notes:
    Writes only to the operator-selected output directory.
    The archive is replaced atomically; readers never observe
    a partially written document.

  Dependencies:
    serde/serde_json for the document, chrono for timestamps,
    tempfile for atomic replacement.

  Operational Scope:
    Invoked once per run after a successful extraction.

  Revision History:
    2024-11-04 COD  Authored manifest writer.
    2025-11-12 COD  Versioned archive merge for release history.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic ordering for reproducible documents
    - Idempotent runs skip redundant writes
    - Corrupt history degrades to a fresh document, never aborts
============================================================*/

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{PersistenceError, Result, SynscoutError};
use crate::release::ReleaseRecord;

/// Persisted archive document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveDocument {
    pub product: String,
    pub last_updated: DateTime<Utc>,
    pub source_url: String,
    pub latest: Option<LatestRecord>,
    #[serde(default)]
    pub versions: BTreeMap<String, ArchivedRecord>,
}

/// The release currently published as latest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestRecord {
    #[serde(flatten)]
    pub release: ReleaseRecord,
    pub updated_on: DateTime<Utc>,
}

/// A superseded release kept for history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedRecord {
    #[serde(flatten)]
    pub release: ReleaseRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<DateTime<Utc>>,
    pub archived_on: DateTime<Utc>,
}

impl ArchiveDocument {
    /// Empty document with no latest release and no history.
    pub fn fresh(product: &str, source_url: &str, now: DateTime<Utc>) -> Self {
        Self {
            product: product.to_string(),
            last_updated: now,
            source_url: source_url.to_string(),
            latest: None,
            versions: BTreeMap::new(),
        }
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.latest.as_ref().map(|latest| latest.release.version.as_str())
    }
}

/// Run-scoped merge inputs.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub product: String,
    pub source_url: String,
    /// Replace `latest` even when the version is unchanged.
    pub force: bool,
}

/// Result of merging a release into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub document: ArchiveDocument,
    pub changed: bool,
    /// Version moved into history by this merge, if any.
    pub archived: Option<String>,
}

/// Merge `release` into `existing`, deciding whether anything changed.
pub fn merge_release(
    existing: Option<ArchiveDocument>,
    release: ReleaseRecord,
    options: &MergeOptions,
    now: DateTime<Utc>,
) -> MergeOutcome {
    let mut document = existing
        .unwrap_or_else(|| ArchiveDocument::fresh(&options.product, &options.source_url, now));

    if !options.force && document.latest_version() == Some(release.version.as_str()) {
        return MergeOutcome {
            document,
            changed: false,
            archived: None,
        };
    }

    let mut archived = None;
    if let Some(previous) = document.latest.take() {
        if previous.release.version != release.version {
            let version = previous.release.version.clone();
            document.versions.insert(
                version.clone(),
                ArchivedRecord {
                    release: previous.release,
                    updated_on: Some(previous.updated_on),
                    archived_on: now,
                },
            );
            archived = Some(version);
        }
    }
    // A version returning upstream leaves history and becomes latest again.
    document.versions.remove(&release.version);

    document.latest = Some(LatestRecord {
        release,
        updated_on: now,
    });
    document.last_updated = now;
    document.source_url = options.source_url.clone();

    MergeOutcome {
        document,
        changed: true,
        archived,
    }
}

/// State of the archive file before a run.
#[derive(Debug)]
pub enum LoadOutcome {
    Missing,
    Loaded(ArchiveDocument),
    Corrupt(PersistenceError),
}

impl LoadOutcome {
    #[cfg(test)]
    pub fn into_document(self) -> Option<ArchiveDocument> {
        match self {
            LoadOutcome::Loaded(document) => Some(document),
            LoadOutcome::Missing | LoadOutcome::Corrupt(_) => None,
        }
    }
}

/// Read the archive; unreadable or unparsable content is reported, not raised.
pub fn load_archive(path: &Path) -> LoadOutcome {
    let corrupt = |reason: String| {
        LoadOutcome::Corrupt(PersistenceError {
            path: path.display().to_string(),
            reason,
        })
    };

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return LoadOutcome::Missing,
        Err(err) => return corrupt(err.to_string()),
    };
    match serde_json::from_str(&raw) {
        Ok(document) => LoadOutcome::Loaded(document),
        Err(err) => corrupt(err.to_string()),
    }
}

/// Pretty JSON form of the document, newline-terminated.
pub fn render_archive(document: &ArchiveDocument) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(document).map_err(|err| {
        SynscoutError::Serialization(format!("Failed to serialise archive: {err}"))
    })?;
    rendered.push('\n');
    Ok(rendered)
}

/// Persist the archive, replacing any previous file atomically.
pub fn write_archive(document: &ArchiveDocument, path: &Path) -> Result<()> {
    let rendered = render_archive(document)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|err| {
        SynscoutError::Filesystem(format!(
            "Failed to create archive directory {}: {err}",
            parent.display()
        ))
    })?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|err| {
        SynscoutError::Filesystem(format!(
            "Failed to stage archive in {}: {err}",
            parent.display()
        ))
    })?;
    staged
        .write_all(rendered.as_bytes())
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|err| {
            SynscoutError::Filesystem(format!("Failed to write staged archive: {err}"))
        })?;
    staged.persist(path).map_err(|err| {
        SynscoutError::Filesystem(format!(
            "Failed to replace archive {}: {}",
            path.display(),
            err.error
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{DownloadEntry, Platform};
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, day, 12, 0, 0).unwrap()
    }

    fn release(update: u32) -> ReleaseRecord {
        let mut downloads = BTreeMap::new();
        for (platform, bundle) in [(Platform::WindowsX64, "100"), (Platform::LinuxX64, "200")] {
            downloads.insert(
                platform,
                DownloadEntry {
                    platform,
                    bundle_id: format!("{bundle}{update}"),
                    url: format!(
                        "https://javadl.oracle.com/webapps/download/AutoDL?BundleId={bundle}{update}_abc123"
                    ),
                    file_size: (platform == Platform::LinuxX64).then(|| "92.43 MB".to_string()),
                },
            );
        }
        ReleaseRecord {
            version: ReleaseRecord::version_for_update(update),
            update_number: update,
            release_date: Some("October 21, 2025".into()),
            downloads,
        }
    }

    fn options(force: bool) -> MergeOptions {
        MergeOptions {
            product: "Java".into(),
            source_url: "https://www.java.com/en/download/manual.jsp".into(),
            force,
        }
    }

    #[test]
    fn first_run_creates_document() {
        let outcome = merge_release(None, release(461), &options(false), at(1));
        assert!(outcome.changed);
        assert_eq!(outcome.archived, None);
        let document = outcome.document;
        assert_eq!(document.product, "Java");
        assert_eq!(document.last_updated, at(1));
        assert_eq!(document.latest_version(), Some("8u461"));
        assert_eq!(document.latest.unwrap().updated_on, at(1));
        assert!(document.versions.is_empty());
    }

    #[test]
    fn unchanged_version_is_skipped_byte_for_byte() {
        let first = merge_release(None, release(471), &options(false), at(1)).document;
        let before = render_archive(&first).unwrap();

        let outcome = merge_release(Some(first.clone()), release(471), &options(false), at(2));
        assert!(!outcome.changed);
        assert_eq!(outcome.document, first);
        assert_eq!(render_archive(&outcome.document).unwrap(), before);

        let again = merge_release(Some(outcome.document), release(471), &options(false), at(3));
        assert!(!again.changed);
        assert_eq!(render_archive(&again.document).unwrap(), before);
    }

    #[test]
    fn new_version_archives_previous_latest() {
        let first = merge_release(None, release(461), &options(false), at(1)).document;
        let outcome = merge_release(Some(first), release(471), &options(false), at(5));
        assert!(outcome.changed);
        assert_eq!(outcome.archived.as_deref(), Some("8u461"));

        let document = outcome.document;
        assert_eq!(document.latest_version(), Some("8u471"));
        assert_eq!(document.last_updated, at(5));
        let old = &document.versions["8u461"];
        assert_eq!(old.release, release(461));
        assert_eq!(old.updated_on, Some(at(1)));
        assert_eq!(old.archived_on, at(5));
        assert!(!document.versions.contains_key("8u471"));
    }

    #[test]
    fn history_entries_are_preserved() {
        let mut document = merge_release(None, release(451), &options(false), at(1)).document;
        document = merge_release(Some(document), release(461), &options(false), at(2)).document;
        let archived_451 = document.versions["8u451"].clone();

        document = merge_release(Some(document), release(471), &options(false), at(3)).document;
        assert_eq!(document.versions.len(), 2);
        assert_eq!(document.versions["8u451"], archived_451);
        assert_eq!(document.versions["8u461"].archived_on, at(3));
    }

    #[test]
    fn force_refreshes_latest_without_archiving() {
        let first = merge_release(None, release(471), &options(false), at(1)).document;
        let outcome = merge_release(Some(first), release(471), &options(true), at(4));
        assert!(outcome.changed);
        assert_eq!(outcome.archived, None);
        assert!(outcome.document.versions.is_empty());
        assert_eq!(outcome.document.latest.unwrap().updated_on, at(4));
        assert_eq!(outcome.document.last_updated, at(4));
    }

    #[test]
    fn returning_version_leaves_history() {
        let mut document = merge_release(None, release(461), &options(false), at(1)).document;
        document = merge_release(Some(document), release(471), &options(false), at(2)).document;
        let outcome = merge_release(Some(document), release(461), &options(false), at(3));

        let document = outcome.document;
        assert_eq!(document.latest_version(), Some("8u461"));
        assert!(!document.versions.contains_key("8u461"));
        assert!(document.versions.contains_key("8u471"));
    }

    #[test]
    fn document_round_trips_through_json() {
        let first = merge_release(None, release(461), &options(false), at(1)).document;
        let document = merge_release(Some(first), release(471), &options(false), at(2)).document;

        let rendered = render_archive(&document).unwrap();
        let parsed: ArchiveDocument = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, document);
    }

    #[test]
    fn persisted_shape_uses_keyed_maps() {
        let first = merge_release(None, release(461), &options(false), at(1)).document;
        let document = merge_release(Some(first), release(471), &options(false), at(2)).document;
        let value = serde_json::to_value(&document).unwrap();

        assert_eq!(value["sourceUrl"], "https://www.java.com/en/download/manual.jsp");
        assert_eq!(value["lastUpdated"], "2025-10-02T12:00:00Z");
        assert_eq!(value["latest"]["version"], "8u471");
        assert_eq!(value["latest"]["updatedOn"], "2025-10-02T12:00:00Z");
        assert_eq!(value["latest"]["downloads"]["Windows_x64"]["platform"], "Windows_x64");
        assert_eq!(value["versions"]["8u461"]["archivedOn"], "2025-10-02T12:00:00Z");
        assert_eq!(value["versions"]["8u461"]["updateNumber"], 461);
    }

    #[test]
    fn load_reports_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Java.json");
        assert!(matches!(load_archive(&path), LoadOutcome::Missing));

        std::fs::write(&path, "{ not json").unwrap();
        match load_archive(&path) {
            LoadOutcome::Corrupt(err) => assert!(err.path.ends_with("Java.json")),
            other => panic!("expected corrupt outcome, got {other:?}"),
        }
        assert!(load_archive(&path).into_document().is_none());
    }

    #[test]
    fn corrupt_file_is_replaced_by_fresh_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Java.json");
        std::fs::write(&path, "[1, 2,").unwrap();

        let existing = load_archive(&path).into_document();
        let outcome = merge_release(existing, release(471), &options(false), at(7));
        assert!(outcome.changed);
        write_archive(&outcome.document, &path).unwrap();

        match load_archive(&path) {
            LoadOutcome::Loaded(document) => {
                assert_eq!(document, outcome.document);
                assert!(document.versions.is_empty());
            }
            other => panic!("expected loaded archive, got {other:?}"),
        }
    }

    #[test]
    fn write_creates_directory_and_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("Java.json");
        let document = merge_release(None, release(471), &options(false), at(1)).document;

        write_archive(&document, &path).unwrap();
        write_archive(&document, &path).unwrap();

        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("Java.json")]);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            render_archive(&document).unwrap()
        );
    }
}
