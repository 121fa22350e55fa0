use std::{fs, path::PathBuf};

use soluce::{ExoEntry, Exomap, Placement, Solution, Source, Stats};
use tempfile::TempDir;

/// Surfaces the scanner's diagnostics when a test runs with --nocapture.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write source file");
    path
}

fn placement(week: &str, sequence: &str) -> Placement {
    Placement {
        week:     week.to_string(),
        sequence: sequence.to_string(),
    }
}

fn entry(week: &str, sequence: &str, stem: &str) -> ExoEntry {
    ExoEntry {
        placement:   placement(week, sequence),
        source_stem: stem.to_string(),
    }
}

#[test]
fn extracts_code_verbatim_between_tags() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_carre.py",
        "# @BEG@ name=carre week=2 sequence=3\ndef carre(n):\n\n    return n*n\n# @END@\n",
    );

    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    assert_eq!(parsed.solutions.len(), 1);
    let solution = &parsed.solutions[0];
    assert_eq!(solution.name, "carre");
    assert_eq!(solution.week, "2");
    assert_eq!(solution.sequence, "3");
    // interior lines verbatim, newline-terminated, blank line preserved
    assert_eq!(solution.code, "def carre(n):\n\n    return n*n\n");
}

#[test]
fn first_block_is_primary_later_blocks_are_siblings() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_carre.py",
        concat!(
            "# @BEG@ name=carre\n",
            "return n*n\n",
            "# @END@\n",
            "# @BEG@ name=carre more=bis\n",
            "return n**2\n",
            "# @END@\n",
        ),
    );
    let mut exomap = Exomap::default();
    exomap.insert("carre", entry("2", "3", "exo_carre"));

    let parsed = Source::new(path).parse(&exomap, None).expect("parse");
    assert_eq!(parsed.solutions.len(), 2);

    let primary = &parsed.solutions[0];
    assert_eq!(primary.name, "carre");
    assert!(primary.more.is_none());
    assert_eq!(primary.siblings.len(), 1);
    assert_eq!(primary.siblings[0].more.as_deref(), Some("bis"));
    assert_eq!(primary.siblings[0].qual_name(), "carre_bis");
    assert_eq!(primary.siblings[0].code, "return n**2\n");

    // the second entry in encounter order is the sibling itself
    assert_eq!(parsed.solutions[1].more.as_deref(), Some("bis"));
    assert!(parsed.solutions[1].siblings.is_empty());

    let primaries: Vec<_> = parsed.primaries().collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].name, "carre");
}

#[test]
fn missing_name_skips_block_and_continues() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_mixed.py",
        concat!(
            "# @BEG@ week=1 sequence=1\n",
            "this never lands anywhere\n",
            "# @END@\n",
            "# @BEG@ name=good week=1 sequence=1\n",
            "ok = True\n",
            "# @END@\n",
        ),
    );

    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    assert_eq!(parsed.solutions.len(), 1);
    assert_eq!(parsed.solutions[0].name, "good");
}

#[test]
fn explicit_placement_overrides_exomap() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_carre.py",
        "# @BEG@ name=carre week=2 sequence=3\nreturn n*n\n# @END@\n",
    );
    let mut exomap = Exomap::default();
    exomap.insert("carre", entry("9", "9", "exo_other"));

    let parsed = Source::new(path).parse(&exomap, None).expect("parse");
    assert_eq!(parsed.solutions[0].week, "2");
    assert_eq!(parsed.solutions[0].sequence, "3");

    // the explicit placement is reported back for the exomap to absorb
    assert_eq!(parsed.discoveries.len(), 1);
    assert_eq!(parsed.discoveries[0].name, "carre");
    assert_eq!(parsed.discoveries[0].entry.placement, placement("2", "3"));
    assert_eq!(parsed.discoveries[0].entry.source_stem, "exo_carre");
}

#[test]
fn context_inherited_when_tag_is_bare() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "w1-s2-x1.py",
        "# @BEG@ name=taylor\nreturn series\n# @END@\n",
    );

    let context = placement("1", "2");
    let parsed = Source::new(path)
        .parse(&Exomap::default(), Some(&context))
        .expect("parse");
    assert_eq!(parsed.solutions[0].week, "1");
    assert_eq!(parsed.solutions[0].sequence, "2");
    assert_eq!(parsed.discoveries.len(), 1);
    assert_eq!(parsed.discoveries[0].entry.source_stem, "w1-s2-x1");
}

#[test]
fn explicit_first_block_places_later_bare_siblings() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_cesar.py",
        concat!(
            "# @BEG@ name=cesar week=6 sequence=2\n",
            "return encode(text)\n",
            "# @END@\n",
            "# @BEG@ name=cesar more=bis\n",
            "return decode(text)\n",
            "# @END@\n",
        ),
    );

    // nothing pre-recorded: the bare sibling block can only resolve
    // through the placement the first block spelled out
    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    assert_eq!(parsed.solutions.len(), 2);

    let sibling = &parsed.solutions[1];
    assert_eq!(sibling.more.as_deref(), Some("bis"));
    assert_eq!(sibling.week, "6");
    assert_eq!(sibling.sequence, "2");
    assert_eq!(parsed.solutions[0].siblings.len(), 1);
}

#[test]
fn exomap_lookup_used_as_fallback() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_carre.py",
        "# @BEG@ name=carre\nreturn n*n\n# @END@\n",
    );
    let mut exomap = Exomap::default();
    exomap.insert("carre", entry("2", "3", "exo_carre"));

    let parsed = Source::new(path).parse(&exomap, None).expect("parse");
    assert_eq!(parsed.solutions[0].week, "2");
    assert_eq!(parsed.solutions[0].sequence, "3");
    // a plain lookup teaches the exomap nothing new
    assert!(parsed.discoveries.is_empty());
}

#[test]
fn unresolved_placement_drops_block() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_lost.py",
        "# @BEG@ name=nowhere\nreturn 0\n# @END@\n",
    );

    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    assert!(parsed.solutions.is_empty());
}

#[test]
fn unknown_keyword_rejects_only_that_block() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_mixed.py",
        concat!(
            "# @BEG@ name=bad week=1 sequence=1 size=big\n",
            "return 1\n",
            "# @END@\n",
            "# @BEG@ name=good week=1 sequence=1\n",
            "return 2\n",
            "# @END@\n",
        ),
    );

    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    assert_eq!(parsed.solutions.len(), 1);
    assert_eq!(parsed.solutions[0].name, "good");
}

#[test]
fn unexpected_end_is_ignored() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(&dir, "exo_stray.py", "x = 1\n# @END@\ny = 2\n");

    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    assert!(parsed.solutions.is_empty());
}

#[test]
fn misplaced_marker_is_never_treated_as_code() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_carre.py",
        concat!(
            "# @BEG@ name=carre week=2 sequence=3\n",
            "line one\n",
            "## @BEG@ name=mangled\n",
            "line two\n",
            "# @END@\n",
        ),
    );

    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    assert_eq!(parsed.solutions.len(), 1);
    assert_eq!(parsed.solutions[0].code, "line one\nline two\n");
}

#[test]
fn unterminated_block_is_not_emitted() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_open.py",
        "# @BEG@ name=open week=1 sequence=1\nstill going\n",
    );

    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    assert!(parsed.solutions.is_empty());
}

#[test]
fn flags_and_rendering_hints_pass_through() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "cls_point.py",
        concat!(
            "# @BEG@ name=point week=5 sequence=2 latex_size=footnotesize ",
            "no_validation=skip continued=yes\n",
            "class Point:\n",
            "    pass\n",
            "# @END@\n",
        ),
    );

    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    let solution = &parsed.solutions[0];
    assert!(solution.no_validation);
    assert!(solution.continued);
    assert!(!solution.no_example);
    assert_eq!(solution.latex_size, "footnotesize");

    // class-ness is derived from the source stem prefix
    let snapshot = serde_json::to_value(solution).unwrap();
    assert_eq!(snapshot["is_class"], true);
    assert_eq!(snapshot["source_stem"], "cls_point");
}

#[test]
fn solution_builder_fills_defaults() {
    let solution = Solution::builder()
        .path(PathBuf::from("exo_carre.py"))
        .source_stem("exo_carre")
        .week("2")
        .sequence("3")
        .name("carre")
        .build();
    assert_eq!(solution.latex_size, "small");
    assert!(!solution.is_class);
    assert!(!solution.continued);
    assert!(solution.code.is_empty());
    assert!(solution.siblings.is_empty());
    assert_eq!(solution.qual_name(), "carre");
}

#[test]
fn stats_tally_solutions_and_skips() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_source(
        &dir,
        "exo_mixed.py",
        concat!(
            "# @BEG@ name=carre week=1 sequence=1\n",
            "return n*n\n",
            "# @END@\n",
            "# @BEG@ name=carre more=bis week=1 sequence=1\n",
            "return n**2\n",
            "# @END@\n",
            "# @BEG@ name=twisted week=1 sequence=2 no_validation=t\n",
            "pass\n",
            "# @END@\n",
        ),
    );

    let parsed = Source::new(path).parse(&Exomap::default(), None).expect("parse");
    let stats = Stats::collect(&parsed.solutions);
    assert_eq!(stats.total_solutions, 3);
    assert_eq!(stats.distinct_exercises, 2);
    assert_eq!(stats.skipped.len(), 1);
    assert_eq!(stats.skipped[0].name, "twisted");
    assert_eq!(
        stats.to_string(),
        "We have a total of 3 solutions for 2 different exos - 1 not validated"
    );
}
