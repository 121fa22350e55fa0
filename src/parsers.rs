#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::{exomap::ImportRef, solution::Placement};

peg::parser! {
    /// Grammars for the textual shapes the extraction pipeline consumes:
    /// tag sentinel lines, the two filename stem conventions, and
    /// import-reference lines found in corpus files.
    pub grammar tags() for str {
        /// matches one or more decimal digits, kept as a string
        rule digits() -> String
            = d:$(['0'..='9']+) { d.to_string() }

        /// matches a run of spaces or tabs
        rule sp() = quiet!{[' ' | '\t']+}

        /// matches the keyword on the left of a tag assignment
        rule key() -> String
            = k:$(['a'..='z' | '_']+) { k.to_string() }

        /// matches a tag assignment value (no spaces, no quoting)
        rule value() -> String
            = v:$(['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-']+) { v.to_string() }

        /// matches one whitespace-led `key=value` assignment
        rule assignment() -> (String, String)
            = sp() k:key() "=" v:value() { (k, v) }

        /// parses a begin-tag line: a single leader character, the `@BEG@`
        /// sentinel, then one or more assignments up to end of line
        pub rule begin_tag() -> Vec<(String, String)>
            = [_] " @BEG@" kvs:(assignment()+) sp()? ![_] { kvs }

        /// parses an end-tag line: a single leader character and the
        /// `@END@` sentinel; trailing content is ignored
        pub rule end_tag()
            = [_] " @END@" [_]*

        /// parses a corpus filename stem like `w1-s3-x2-foo` into its
        /// week/sequence placement
        pub rule corpus_stem() -> Placement
            = "w" w:digits() "-s" s:digits() [_]*
            { Placement { week: w, sequence: s } }

        /// parses an exercise-module filename stem like `w2s1_intro`
        pub rule module_stem() -> Placement
            = "w" w:digits() "s" s:digits() "_" [_]*
            { Placement { week: w, sequence: s } }

        /// matches a python identifier fragment
        rule ident() -> String
            = i:$(['a'..='z' | 'A'..='Z' | '0'..='9' | '_']+) { i.to_string() }

        /// matches the stem of an exercise source module, which always
        /// carries one of the recognized kind prefixes
        rule source_stem() -> String
            = s:$(("regexp" / "gen" / "exo" / "cls") "_" ident()) { s.to_string() }

        /// parses an import reference like
        /// `from corrections.exo_carre import exo_carre`; trailing content
        /// is ignored since the line may sit inside notebook JSON
        pub rule import_ref() -> ImportRef
            = "from" sp() "corrections." s:source_stem() sp()
              "import" sp() "exo_" e:ident() [_]*
            { ImportRef { source_stem: s, exercise: e } }
    }
}

/// Searches a whole line for an embedded import reference.
///
/// Corpus lines are usually notebook JSON, so the reference rarely starts
/// at column zero; every `from` occurrence is tried as an anchor.
pub fn scan_import(line: &str) -> Option<ImportRef> {
    line.match_indices("from")
        .find_map(|(idx, _)| tags::import_ref(&line[idx..]).ok())
}
