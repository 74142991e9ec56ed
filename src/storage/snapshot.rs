//! Snapshot files of consensus-built families.
//!
//! A snapshot maps canonical ids to families and is the hand-off between
//! the offline corpus build and the online selection stage. Files ending in
//! `.gz` are gzip-compressed JSON; anything else is plain JSON.
//!
//! Two per-family shapes are accepted on load:
//!
//! ```json
//! { "SAL": ["salary", "salad"],
//!   "BHEL": { "words": ["bowl", "bold"], "gloss": "to swell", "sources": 3 } }
//! ```
//!
//! Both resolve to [`RootFamily`] at load time. Saving always writes the
//! second shape.

use crate::models::{CanonicalRootId, RootFamily, StoredFamily};
use crate::{Error, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// A loaded set of families.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilySnapshot {
    families: BTreeMap<CanonicalRootId, RootFamily>,
    legacy: usize,
}

impl FamilySnapshot {
    /// Wraps families for saving.
    #[must_use]
    pub const fn from_families(families: BTreeMap<CanonicalRootId, RootFamily>) -> Self {
        Self {
            families,
            legacy: 0,
        }
    }

    /// Loads a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be read or is not
    /// a valid snapshot.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| io_error("open_snapshot", path, &e))?;
        let reader = BufReader::new(file);

        let snapshot = if is_gzip(path) {
            Self::from_reader(GzDecoder::new(reader))
        } else {
            Self::from_reader(reader)
        }?;

        tracing::info!(
            path = %path.display(),
            families = snapshot.families.len(),
            legacy = snapshot.legacy,
            "Loaded family snapshot"
        );
        Ok(snapshot)
    }

    /// Parses snapshot JSON from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the JSON is not a valid snapshot.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let stored: BTreeMap<String, StoredFamily> =
            serde_json::from_reader(reader).map_err(|e| Error::OperationFailed {
                operation: "parse_snapshot".to_string(),
                cause: e.to_string(),
            })?;

        let mut legacy = 0;
        let families = stored
            .into_iter()
            .map(|(id, family)| {
                if family.is_legacy() {
                    legacy += 1;
                }
                let id = CanonicalRootId::new(id);
                (id.clone(), family.into_family(id))
            })
            .collect();

        Ok(Self { families, legacy })
    }

    /// Writes the snapshot, replacing `path` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| io_error("create_snapshot_dir", parent, &e))?;
        }

        let tmp = tmp_path(path);
        let file = File::create(&tmp).map_err(|e| io_error("create_snapshot", &tmp, &e))?;
        let mut writer = BufWriter::new(file);

        if is_gzip(path) {
            let mut encoder = GzEncoder::new(&mut writer, Compression::default());
            self.write_json(&mut encoder, false)?;
            encoder
                .finish()
                .map_err(|e| io_error("write_snapshot", &tmp, &e))?;
        } else {
            self.write_json(&mut writer, true)?;
        }
        writer
            .flush()
            .map_err(|e| io_error("write_snapshot", &tmp, &e))?;
        drop(writer);

        std::fs::rename(&tmp, path).map_err(|e| io_error("rename_snapshot", path, &e))?;
        tracing::info!(path = %path.display(), families = self.families.len(), "Saved family snapshot");
        Ok(())
    }

    /// Writes snapshot JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if serialization fails.
    pub fn write_json<W: Write>(&self, writer: W, pretty: bool) -> Result<()> {
        let stored: BTreeMap<&str, StoredFamily> = self
            .families
            .iter()
            .map(|(id, family)| (id.as_str(), StoredFamily::from(family)))
            .collect();

        let result = if pretty {
            serde_json::to_writer_pretty(writer, &stored)
        } else {
            serde_json::to_writer(writer, &stored)
        };
        result.map_err(|e| Error::OperationFailed {
            operation: "serialize_snapshot".to_string(),
            cause: e.to_string(),
        })
    }

    /// The families, keyed by canonical id.
    #[must_use]
    pub const fn families(&self) -> &BTreeMap<CanonicalRootId, RootFamily> {
        &self.families
    }

    /// Consumes the snapshot.
    #[must_use]
    pub fn into_families(self) -> BTreeMap<CanonicalRootId, RootFamily> {
        self.families
    }

    /// Number of families that were stored in the legacy flat shape.
    #[must_use]
    pub const fn legacy_count(&self) -> usize {
        self.legacy
    }

    /// Drops families attested by fewer than `min_sources` sources or with
    /// fewer than two words.
    #[must_use]
    pub fn corroborated(mut self, min_sources: usize) -> Self {
        self.families
            .retain(|_, f| f.source_count >= min_sources && f.words.len() >= 2);
        self
    }

    /// Number of families.
    #[must_use]
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Returns true if there are no families.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(operation: &str, path: &Path, e: &std::io::Error) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: format!("{}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = r#"{
        "SAL": ["salary", "salad"],
        "BHEL": {"words": ["bowl", "bold"], "gloss": "to swell", "sources": 3},
        "WER": {"words": ["warp", "wrist"], "source_count": 2}
    }"#;

    #[test]
    fn test_mixed_shapes_resolve() {
        let snapshot = FamilySnapshot::from_reader(MIXED.as_bytes()).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.legacy_count(), 1);

        let families = snapshot.families();
        let sal = &families[&CanonicalRootId::new("SAL")];
        assert_eq!(sal.source_count, 1);
        assert!(sal.gloss.is_none());

        let bhel = &families[&CanonicalRootId::new("BHEL")];
        assert_eq!(bhel.source_count, 3);
        assert_eq!(bhel.gloss.as_deref(), Some("to swell"));
        assert_eq!(families[&CanonicalRootId::new("WER")].source_count, 2);
    }

    #[test]
    fn test_corroborated_drops_legacy() {
        let snapshot = FamilySnapshot::from_reader(MIXED.as_bytes())
            .unwrap()
            .corroborated(2);
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.families().contains_key(&CanonicalRootId::new("SAL")));
    }

    #[test]
    fn test_invalid_json() {
        assert!(FamilySnapshot::from_reader("[1, 2]".as_bytes()).is_err());
        assert!(FamilySnapshot::from_reader("{\"X\": 3}".as_bytes()).is_err());
    }

    #[test]
    fn test_save_and_load_plain_and_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let original = FamilySnapshot::from_reader(MIXED.as_bytes()).unwrap();
        let families = original.into_families();
        let snapshot = FamilySnapshot::from_families(families.clone());

        for name in ["roots.json", "nested/roots.json.gz"] {
            let path = dir.path().join(name);
            snapshot.save(&path).unwrap();
            assert!(!tmp_path(&path).exists());

            let loaded = FamilySnapshot::load(&path).unwrap();
            assert_eq!(loaded.legacy_count(), 0);
            assert_eq!(loaded.families(), &families);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FamilySnapshot::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }
}
