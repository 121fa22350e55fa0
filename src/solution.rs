#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::constants::{CLASS_STEM_PREFIX, DEFAULT_LATEX_SIZE};

/// Locates an exercise within the course timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Week number, kept as a string the way filenames spell it.
    pub week:     String,
    /// Sequence number within the week.
    pub sequence: String,
}

impl Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "w{}s{}", self.week, self.sequence)
    }
}

/// An enum to represent possible errors on a `@BEG@` tag line.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TagError {
    /// The mandatory `name` keyword is absent.
    #[error("'name' missing keyword")]
    MissingName,
    /// The tag carries a keyword outside the recognized set.
    #[error("unknown keyword `{key}` in @BEG@ tag")]
    UnknownKeyword {
        /// The offending keyword.
        key: String,
    },
    /// Neither the tag, the caller, nor the exomap could supply a
    /// week/sequence for this exercise.
    #[error("cannot spot week or sequence for `{name}`")]
    UnresolvedPlacement {
        /// The exercise the block was tagged with.
        name: String,
    },
}

/// The fixed, enumerated set of keywords a `@BEG@` tag may carry.
///
/// Flag keywords are set by presence; their value is ignored. Duplicate
/// keywords are last-wins, matching how the tags were always read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagKeywords {
    /// Exercise identifier (mandatory).
    pub name:          String,
    /// Variant label for an alternate solution, e.g. `bis`.
    pub more:          Option<String>,
    /// Rendering hint for solutions too wide for the default font size.
    pub latex_size:    Option<String>,
    /// Opt out of automatic example/check generation.
    pub no_validation: bool,
    /// Suppress the example invocation in the validation notebook.
    pub no_example:    bool,
    /// Marks an artificial split of one logical block (page breaks).
    pub continued:     bool,
    /// Explicit week, overriding any cross-referenced placement.
    pub week:          Option<String>,
    /// Explicit sequence, overriding any cross-referenced placement.
    pub sequence:      Option<String>,
}

impl TagKeywords {
    /// Folds raw `key=value` pairs into the enumerated record.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, TagError> {
        let mut keywords = TagKeywords::default();
        let mut name = None;
        for (key, value) in pairs {
            match key.as_str() {
                "name" => name = Some(value.clone()),
                "more" => keywords.more = Some(value.clone()),
                "latex_size" => keywords.latex_size = Some(value.clone()),
                "no_validation" => keywords.no_validation = true,
                "no_example" => keywords.no_example = true,
                "continued" => keywords.continued = true,
                "week" => keywords.week = Some(value.clone()),
                "sequence" => keywords.sequence = Some(value.clone()),
                _ => return Err(TagError::UnknownKeyword { key: key.clone() }),
            }
        }
        keywords.name = name.ok_or(TagError::MissingName)?;
        Ok(keywords)
    }

    /// Returns the placement when the tag spells out both halves.
    pub fn explicit_placement(&self) -> Option<Placement> {
        match (&self.week, &self.sequence) {
            (Some(week), Some(sequence)) => Some(Placement {
                week:     week.clone(),
                sequence: sequence.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(on(String, into))]
/// One extracted solution block, with its placement and rendering flags.
///
/// An exercise may have several solutions; the first one encountered in a
/// parse pass is the primary and owns the `siblings` list.
pub struct Solution {
    /// Path of the originating source file.
    pub path:          PathBuf,
    /// Stem of the originating file, e.g. `exo_carre`.
    pub source_stem:   String,
    /// True when the originating stem carries the class prefix.
    #[builder(default)]
    pub is_class:      bool,
    /// Week this solution belongs to.
    pub week:          String,
    /// Sequence this solution belongs to.
    pub sequence:      String,
    /// Exercise identifier.
    pub name:          String,
    /// Variant label for an alternate solution.
    pub more:          Option<String>,
    /// Marks a continuation chunk to be concatenated by renderers.
    #[builder(default)]
    pub continued:     bool,
    /// LaTeX font size for rendering.
    #[builder(default = DEFAULT_LATEX_SIZE.to_string())]
    pub latex_size:    String,
    /// If set, no validation material is generated for this exercise.
    #[builder(default)]
    pub no_validation: bool,
    /// If set, the example invocation is suppressed.
    #[builder(default)]
    pub no_example:    bool,
    /// Code lines accumulated by the scanner, each newline-terminated.
    #[builder(default)]
    pub code:          String,
    /// Alternate solutions for the same exercise, carried by the primary.
    #[builder(default)]
    pub siblings:      Vec<Solution>,
}

impl Solution {
    /// Builds a solution record from a matched begin tag.
    pub fn from_tag(path: &Path, placement: Placement, keywords: TagKeywords) -> Self {
        let source_stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let is_class = source_stem.starts_with(CLASS_STEM_PREFIX);
        Solution::builder()
            .path(path.to_path_buf())
            .source_stem(source_stem)
            .is_class(is_class)
            .week(placement.week)
            .sequence(placement.sequence)
            .name(keywords.name)
            .maybe_more(keywords.more)
            .continued(keywords.continued)
            .maybe_latex_size(keywords.latex_size)
            .no_validation(keywords.no_validation)
            .no_example(keywords.no_example)
            .build()
    }

    /// Name qualified with the variant label, e.g. `carre_bis`.
    pub fn qual_name(&self) -> String {
        match &self.more {
            Some(more) => format!("{}_{}", self.name, more),
            None => self.name.clone(),
        }
    }

    /// Appends one code line, restoring the newline the scanner stripped.
    pub fn add_code_line(&mut self, line: &str) {
        self.code.push_str(line);
        self.code.push('\n');
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "<Solution from {} function={} week={} seq={} more={}>",
            self.source_stem,
            self.name,
            self.week,
            self.sequence,
            self.more.as_deref().unwrap_or("-"),
        )
    }
}
