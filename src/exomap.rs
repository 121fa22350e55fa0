#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::BTreeMap,
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use glob::glob;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{CORPUS_PATTERNS, COURSE_MARKER_DIR},
    parsers::{scan_import, tags},
    solution::Placement,
    source::{Discovery, Source},
};

/// An import-style reference to an exercise, as found on a corpus line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    /// Stem of the source module the exercise lives in.
    pub source_stem: String,
    /// Exercise name, without the `exo_` prefix.
    pub exercise:    String,
}

/// What the exomap knows about one exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExoEntry {
    /// Week and sequence the exercise belongs to.
    pub placement:   Placement,
    /// Stem of the module that provides the exercise.
    pub source_stem: String,
}

/// Keeps track of the association `name -> week x sequence x source stem`
/// for every exercise mentioned anywhere in the course corpus.
///
/// Built once per run by [`Exomap::scan_filesystem`], then consulted
/// read-only while individual source files are scanned for tag blocks.
#[derive(Debug, Clone, Default)]
pub struct Exomap {
    /// Root of the course material tree.
    coursedir: PathBuf,
    /// The mapping itself, name-sorted for reproducible iteration.
    entries:   BTreeMap<String, ExoEntry>,
}

impl Exomap {
    /// Creates an empty map rooted at the given course directory.
    pub fn new(coursedir: impl Into<PathBuf>) -> Self {
        Self {
            coursedir: coursedir.into(),
            entries:   BTreeMap::new(),
        }
    }

    /// Looks up the entry recorded for an exercise name.
    pub fn get(&self, name: &str) -> Option<&ExoEntry> {
        self.entries.get(name)
    }

    /// Records an entry, overwriting any prior one for the same name.
    pub fn insert(&mut self, name: impl Into<String>, entry: ExoEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Number of exercises known to the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no exercise has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, entry)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExoEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Folds scanner discoveries into the map.
    ///
    /// A discovery comes from an explicit tag or an inline block, which is
    /// more specific than an import reference, so it overwrites; within one
    /// batch, later discoveries overwrite earlier ones.
    pub fn absorb(&mut self, discoveries: impl IntoIterator<Item = Discovery>) {
        for discovery in discoveries {
            self.entries.insert(discovery.name, discovery.entry);
        }
    }

    /// Builds the full mapping from the course tree.
    ///
    /// Phase 1 records every import-style reference found in the corpus
    /// files, in sorted path order (so duplicate names are deterministic:
    /// last file wins). Phase 2 re-runs each corpus file through the tag
    /// scanner, since some exercises embed their solution right in the
    /// notebook; each file's discoveries are absorbed before the next file
    /// so forward references keep working. A file that fails phase 2 is
    /// logged and skipped, never fatal.
    ///
    /// Structural problems - an unrecognizable course directory, a corpus
    /// filename that does not encode a week/sequence - are hard errors.
    pub fn scan_filesystem(&mut self) -> Result<()> {
        if !self.coursedir.join(COURSE_MARKER_DIR).exists() {
            bail!("{} not a course dir", self.coursedir.display());
        }
        let files = self.candidate_files()?;

        // phase 1: import references
        for path in &files {
            let placement = stem_placement(path)?;
            let text = fs::read_to_string(path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            for line in text.lines() {
                match scan_import(line) {
                    Some(import) => {
                        tracing::debug!(
                            "exomap: {} -> {placement} ({})",
                            import.exercise,
                            import.source_stem
                        );
                        self.insert(import.exercise, ExoEntry {
                            placement:   placement.clone(),
                            source_stem: import.source_stem,
                        });
                    }
                    None if line.contains("import") && line.contains("from") => {
                        tracing::warn!("ignoring potential exo import ```{}'''", line.trim());
                    }
                    None => {}
                }
            }
        }

        // phase 2: tag blocks embedded right in corpus files
        for path in &files {
            let placement = stem_placement(path)?;
            let source = Source::new(path.clone());
            match source.parse(self, Some(&placement)) {
                Ok(parsed) => self.absorb(parsed.discoveries),
                Err(err) => {
                    tracing::error!("cannot parse {} - {err:#}", source.path().display())
                }
            }
        }

        Ok(())
    }

    /// Distinct source stems appearing in the requested weeks, first
    /// occurrence wins, in map iteration order.
    pub fn all_stems<'a>(&'a self, weeks: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .values()
            .filter(move |entry| weeks.contains(&entry.placement.week.as_str()))
            .map(|entry| entry.source_stem.as_str())
            .unique()
    }

    /// Corpus files under the course directory, in sorted path order.
    fn candidate_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = Vec::new();
        for pattern in CORPUS_PATTERNS {
            let pattern = self.coursedir.join(pattern);
            let pattern = pattern
                .to_str()
                .context("Could not convert course dir to string")?;
            files.extend(
                glob(pattern)
                    .context("Could not create glob")?
                    .filter_map(Result::ok),
            );
        }
        files.sort();
        Ok(files)
    }
}

impl Display for Exomap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, entry) in &self.entries {
            writeln!(
                f,
                "{}-{}-{name}-{}",
                entry.placement.week, entry.placement.sequence, entry.source_stem
            )?;
        }
        Ok(())
    }
}

/// Decodes the week/sequence a corpus filename encodes; a corpus file
/// whose stem does not match the naming pattern means the corpus itself
/// is malformed.
fn stem_placement(path: &Path) -> Result<Placement> {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    tags::corpus_stem(&stem).map_err(|_| anyhow!("something wrong with {stem}"))
}
