//! Bulk dictionary dumps.
//!
//! Reads wiktextract-style JSONL (one [`DictionaryEntry`] per line), plain
//! or gzip-compressed, and feeds each entry through the extractor into a
//! [`ConsensusBuilder`].

use crate::models::DictionaryEntry;
use crate::services::{ConsensusBuilder, EtymologyExtractor};
use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::instrument;

const PROGRESS_EVERY: usize = 100_000;

/// Counters from one pass over a dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusStats {
    /// Entries decoded.
    pub entries: usize,
    /// Lines that were not valid entries.
    pub malformed_lines: usize,
    /// Entries that produced at least one mention.
    pub entries_with_roots: usize,
    /// Mentions produced.
    pub mentions: usize,
}

/// Streams dictionary entries from a JSONL dump.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusReader {
    max_entries: Option<usize>,
}

impl CorpusReader {
    /// Reads the whole dump.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_entries: None }
    }

    /// Stops after `max_entries` decoded entries.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: Option<usize>) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Opens a dump file; `.gz` files are decompressed on the fly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Box<dyn BufRead>> {
        let file = File::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_corpus".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let gzip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
        if gzip {
            Ok(Box::new(BufReader::new(GzDecoder::new(file))))
        } else {
            Ok(Box::new(BufReader::new(file)))
        }
    }

    /// Decodes entries line by line and hands each to `visit`.
    ///
    /// Blank lines are ignored and undecodable lines are counted and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if reading the underlying stream fails.
    pub fn for_each_entry<R, F>(&self, mut reader: R, mut visit: F) -> Result<CorpusStats>
    where
        R: BufRead,
        F: FnMut(DictionaryEntry),
    {
        let mut stats = CorpusStats::default();
        let mut buf = Vec::new();
        let mut line_no: usize = 0;

        loop {
            if self.max_entries.is_some_and(|max| stats.entries >= max) {
                tracing::info!(max_entries = stats.entries, "Reached entry limit");
                break;
            }

            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| Error::OperationFailed {
                    operation: "read_corpus".to_string(),
                    cause: format!("line {}: {e}", line_no + 1),
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                stats.malformed_lines += 1;
                tracing::debug!(line = line_no, "Skipping line that is not valid UTF-8");
                continue;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<DictionaryEntry>(line) {
                Ok(entry) => {
                    stats.entries += 1;
                    visit(entry);
                    if stats.entries % PROGRESS_EVERY == 0 {
                        tracing::info!(entries = stats.entries, "Corpus progress");
                    }
                },
                Err(e) => {
                    stats.malformed_lines += 1;
                    tracing::debug!(line = line_no, error = %e, "Skipping malformed line");
                },
            }
        }

        Ok(stats)
    }

    /// Extracts mentions from every entry and feeds them to `builder`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if reading the stream fails.
    pub fn build<R: BufRead>(
        &self,
        reader: R,
        extractor: &EtymologyExtractor,
        builder: &mut ConsensusBuilder,
    ) -> Result<CorpusStats> {
        let mut mentions = 0;
        let mut entries_with_roots = 0;

        let mut stats = self.for_each_entry(reader, |entry| {
            let found = extractor.extract(&entry);
            if !found.is_empty() {
                entries_with_roots += 1;
                mentions += found.len();
                builder.observe_all(found);
            }
        })?;

        stats.mentions = mentions;
        stats.entries_with_roots = entries_with_roots;
        Ok(stats)
    }

    /// Opens `path` and runs [`build`](Self::build) over it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be opened or read.
    #[instrument(skip(self, extractor, builder), fields(path = %path.display()))]
    pub fn build_from_path(
        &self,
        path: &Path,
        extractor: &EtymologyExtractor,
        builder: &mut ConsensusBuilder,
    ) -> Result<CorpusStats> {
        let stats = self.build(Self::open(path)?, extractor, builder)?;
        tracing::info!(
            entries = stats.entries,
            malformed = stats.malformed_lines,
            with_roots = stats.entries_with_roots,
            mentions = stats.mentions,
            "Corpus read"
        );
        Ok(stats)
    }
}
