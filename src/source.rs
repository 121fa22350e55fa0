#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::PathBuf,
};

use anyhow::{Context, Result};

use crate::{
    constants::{BEG_MARKER, END_MARKER},
    exomap::{ExoEntry, Exomap},
    parsers::tags,
    solution::{Placement, Solution, TagError, TagKeywords},
};

/// A placement learned while scanning, to be folded back into the exomap
/// by the caller.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Exercise the placement was learned for.
    pub name:  String,
    /// The learned placement and originating stem.
    pub entry: ExoEntry,
}

/// Everything one parse pass produced.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    /// Every finalized solution, in encounter order, siblings included.
    pub solutions:   Vec<Solution>,
    /// Placements learned from explicit tag keys or the caller's context.
    pub discoveries: Vec<Discovery>,
}

impl Parsed {
    /// The first solution per distinct exercise name, in first-seen order.
    pub fn primaries(&self) -> impl Iterator<Item = &Solution> {
        let mut seen = HashSet::new();
        self.solutions
            .iter()
            .filter(move |solution| seen.insert(solution.name.clone()))
    }
}

/// A source file holding zero or more tagged solution blocks.
#[derive(Debug, Clone)]
pub struct Source {
    /// Path of the file to scan.
    path: PathBuf,
}

impl Source {
    /// Creates a scanner for one source file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the file this scanner was created for.
    pub fn path(&self) -> &std::path::Path {
        self.path.as_path()
    }

    /// Stem of the scanned file, used to register learned placements.
    fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Scans the file line by line and extracts tagged solution blocks.
    ///
    /// `context` carries a week/sequence already known to the caller,
    /// typically decoded from a corpus filename. Placement precedence is
    /// explicit tag keys, then `context`, then placements already
    /// discovered earlier in this pass (so a bare sibling block can follow
    /// an explicitly placed one), then an exomap lookup; a block resolving
    /// through none of these is dropped with a diagnostic.
    ///
    /// Tag-level problems are logged with file and line number and never
    /// abort the pass; only failing to read the file is an error.
    pub fn parse(&self, exomap: &Exomap, context: Option<&Placement>) -> Result<Parsed> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Could not read {}", self.path.display()))?;

        let mut parsed = Parsed::default();
        // name -> index of the primary in parsed.solutions
        let mut primary_index: HashMap<String, usize> = HashMap::new();
        let mut current: Option<(Solution, usize)> = None;

        for (index, line) in text.lines().enumerate() {
            let lineno = index + 1;
            if let Ok(pairs) = tags::begin_tag(line) {
                if let Some((dropped, _)) = current.take() {
                    tracing::debug!(
                        "{}:{lineno} new @BEG@ drops open block `{}`",
                        self.path.display(),
                        dropped.name
                    );
                }
                match self.open_block(&pairs, lineno, exomap, context, &mut parsed.discoveries) {
                    Ok(solution) => current = Some((solution, lineno)),
                    Err(err) => {
                        tracing::error!("{}:{lineno} {err} - tag ignored", self.path.display())
                    }
                }
            } else if tags::end_tag(line).is_ok() {
                match current.take() {
                    None => tracing::warn!(
                        "{}:{lineno} - Unexpected @END@ - ignored",
                        self.path.display()
                    ),
                    Some((solution, _)) => {
                        match primary_index.get(&solution.name) {
                            Some(&primary) => {
                                parsed.solutions[primary].siblings.push(solution.clone())
                            }
                            None => {
                                primary_index
                                    .insert(solution.name.clone(), parsed.solutions.len());
                            }
                        }
                        parsed.solutions.push(solution);
                    }
                }
            } else if line.contains(BEG_MARKER) || line.contains(END_MARKER) {
                tracing::warn!(
                    "{}:{lineno} Warning - misplaced @BEG|END@ - ignored",
                    self.path.display()
                );
            } else if let Some((solution, _)) = current.as_mut() {
                solution.add_code_line(line);
            }
        }

        if let Some((solution, opened_at)) = current {
            tracing::warn!(
                "{}: block `{}` opened at line {opened_at} never closed - dropped",
                self.path.display(),
                solution.name
            );
        }

        Ok(parsed)
    }

    /// Resolves a begin tag into a fresh solution, recording any placement
    /// the tag or the caller's context taught us.
    fn open_block(
        &self,
        pairs: &[(String, String)],
        lineno: usize,
        exomap: &Exomap,
        context: Option<&Placement>,
        discoveries: &mut Vec<Discovery>,
    ) -> Result<Solution, TagError> {
        let keywords = TagKeywords::from_pairs(pairs)?;

        let placement = if let Some(explicit) = keywords.explicit_placement() {
            tracing::info!(
                "{}:{lineno} using explicit week and sequence",
                self.path.display()
            );
            discoveries.push(Discovery {
                name:  keywords.name.clone(),
                entry: ExoEntry {
                    placement:   explicit.clone(),
                    source_stem: self.stem(),
                },
            });
            explicit
        } else if let Some(context) = context {
            discoveries.push(Discovery {
                name:  keywords.name.clone(),
                entry: ExoEntry {
                    placement:   context.clone(),
                    source_stem: self.stem(),
                },
            });
            context.clone()
        } else if let Some(discovered) = discoveries
            .iter()
            .rev()
            .find(|discovery| discovery.name == keywords.name)
        {
            // a placement learned earlier in this pass shadows the exomap,
            // the way the original's eager backfill overwrote it
            discovered.entry.placement.clone()
        } else if let Some(entry) = exomap.get(&keywords.name) {
            entry.placement.clone()
        } else {
            return Err(TagError::UnresolvedPlacement {
                name: keywords.name.clone(),
            });
        };

        Ok(Solution::from_tag(&self.path, placement, keywords))
    }
}
