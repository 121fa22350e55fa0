//! # soluce
//!
//! Extracts graded-exercise solutions embedded in course source files via
//! `@BEG@`/`@END@` tag markers, and cross-references each exercise with
//! its week/sequence placement in the course timeline.
//!
//! The extraction pipeline has two collaborating pieces:
//!
//! * [`Exomap`] scans the corpus once and answers "which week/sequence
//!   does exercise X belong to?";
//! * [`Source`] scans one file at a time and emits [`Solution`] records,
//!   consulting the exomap for blocks that do not spell out their own
//!   placement.
//!
//! Rendering the records (LaTeX, plain text, validation notebooks) is the
//! consumer's job; this crate only produces them.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// For the exercise-name to week/sequence cross-reference
pub mod exomap;
/// For all parsers used
pub mod parsers;
/// For the extracted solution records and the tag keyword taxonomy
pub mod solution;
/// For scanning one source file into solution records
pub mod source;
/// For summarizing an extraction run
pub mod stats;

pub use exomap::{ExoEntry, Exomap, ImportRef};
pub use solution::{Placement, Solution, TagError, TagKeywords};
pub use source::{Discovery, Parsed, Source};
pub use stats::Stats;
