#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Sentinel that opens a tagged solution block.
pub const BEG_MARKER: &str = "@BEG@";

/// Sentinel that closes a tagged solution block.
pub const END_MARKER: &str = "@END@";

/// Subdirectory whose presence identifies a usable course directory.
pub const COURSE_MARKER_DIR: &str = "w1";

/// Glob patterns, relative to the course directory, for corpus files that
/// may reference or embed exercise solutions.
pub const CORPUS_PATTERNS: &[&str] = &["w?/w*-x*.ipynb", "w?/w*-x*.py"];

/// Source files whose stem starts with this prefix hold class (as opposed
/// to function) exercises.
pub const CLASS_STEM_PREFIX: &str = "cls";

/// LaTeX font size used for a solution unless its tag says otherwise.
pub const DEFAULT_LATEX_SIZE: &str = "small";
