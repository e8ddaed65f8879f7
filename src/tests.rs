use expect_test::{expect, Expect};

use crate::{
    apply_patch, diff, diff_chunks, generate_unified_diff, parse_unified_diff,
    parse_unified_diff_with, split_lines, undo_patch, Chunk, Delta, DeltaKind, DiffEngine, Element,
    EngineError, ParseOptions, Patch, PatchError,
};

const ORIGINAL_TEXT: &[&str] = &[
    "Once upon a time there was a snail named Bob",
    "Bob the snail was stupid",
    "Bob's dad was a cow farmer",
    "Bob liked to eat cows",
    "This didn't work out so well for bob.",
    "",
    "Bob liked cows, but he ate them anyway",
    "He decided to see a therapist.",
    "Bob's dad didn't like therapists, so Bob's dad beat the therapist up",
    "Before the therapist died, he called the police who shot Bob and his dad.",
    "This made the towns people very happy.",
    "",
    "======",
    "======",
    "The End",
];

const CHANGED_TEXT: &[&str] = &[
    "Once upon a time there was a snail named Bob",
    "Bob the snail was smart",
    "Bob's dad was a cow farmer",
    "Bob liked to eat cows",
    "This worked out very well for bob.",
    "",
    "Bob liked money, so he decided to sell cows and not eat them.",
    "He decided to see a trader.",
    "Bob's dad didn't like traders, so Bob's dad beat the trader up",
    "Before the trader died, he called the police who shot Bob and his dad.",
    "This made the towns people very happy.",
    "",
    "The police officer flew to the moon.",
    "Then the moon police shot the earth police officer.",
    "======",
    "======",
];

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|it| (*it).to_string()).collect()
}

fn chars(text: &str) -> Vec<String> {
    text.chars().map(String::from).collect()
}

/// Brute-force oracle: insertions + deletions of an optimal edit script,
/// derived from the longest common subsequence.
fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut lcs = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }
    (a.len() - lcs[0][0]) + (b.len() - lcs[0][0])
}

fn assert_sorted<T: Element>(patch: &Patch<T>) {
    for pair in patch.deltas().windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        assert!(
            first.original().position() + first.original().size()
                <= second.original().position(),
            "deltas overlap in the original: {first} / {second}"
        );
        assert!(
            first.original().position() < second.original().position(),
            "original positions not strictly increasing: {first} / {second}"
        );
        assert!(
            first.revised().position() < second.revised().position(),
            "revised positions not strictly increasing: {first} / {second}"
        );
    }
}

fn check_unified(original: &[String], patch: &Patch<String>, context_size: usize, expect: Expect) {
    let mut actual = generate_unified_diff("a", "b", original, patch, context_size).join("\n");
    actual.push('\n');
    expect.assert_eq(&actual);
}

#[test]
fn story_round_trip_on_every_engine() {
    let original = owned(ORIGINAL_TEXT);
    let changed = owned(CHANGED_TEXT);
    for engine in DiffEngine::available() {
        let patch = engine.diff(&original, &changed);
        assert!(!patch.is_empty());
        assert_sorted(&patch);
        assert_eq!(patch.apply(&original).unwrap(), changed, "{engine}");
        assert_eq!(patch.restore(&changed).unwrap(), original, "{engine}");

        let text = generate_unified_diff("a", "b", &original, &patch, 1).join("\n");
        let report = parse_unified_diff_with(engine, ParseOptions::default(), &text).unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.patch, patch, "{engine}");
        assert_eq!(report.patch.apply(&original).unwrap(), changed);
    }
}

#[test]
fn identical_inputs_diff_to_nothing() {
    let lines = owned(ORIGINAL_TEXT);
    let patch = diff(&lines, &lines);
    assert!(patch.is_empty());
    assert_eq!(patch.apply(&lines).unwrap(), lines);
    assert!(generate_unified_diff("a", "b", &lines, &patch, 3).is_empty());

    let empty: Vec<String> = Vec::new();
    assert!(diff(&empty, &empty).is_empty());
}

#[test]
fn patches_are_minimal() {
    let cases = [
        ("ABCABBA", "CBABAC"),
        ("abgdef", "gh"),
        ("bat", "map"),
        ("abc", "def"),
        ("", "abc"),
        ("abc", ""),
        ("same", "same"),
        ("xaby", "xbay"),
        ("xay", "xaay"),
    ];
    for engine in DiffEngine::available() {
        for (a, b) in cases {
            let (a, b) = (chars(a), chars(b));
            let patch = engine.diff(&a, &b);
            assert_sorted(&patch);
            assert_eq!(patch.apply(&a).unwrap(), b);
            assert_eq!(patch.restore(&b).unwrap(), a);
            let total: usize = patch
                .deltas()
                .iter()
                .map(|delta| delta.original().size() + delta.revised().size())
                .sum();
            assert_eq!(total, edit_distance(&a, &b), "{engine}: {a:?} -> {b:?}");
        }
    }
}

#[test]
fn engines_agree_on_output() {
    let original = owned(ORIGINAL_TEXT);
    let changed = owned(CHANGED_TEXT);
    let engines = DiffEngine::available();
    let reference = engines[0].diff(&original, &changed);
    for engine in &engines[1..] {
        assert_eq!(engine.diff(&original, &changed), reference, "{engine}");
    }
}

#[test]
fn totally_distinct_sequences_become_one_change() {
    let patch = diff(&chars("ab"), &chars("cd"));
    assert_eq!(patch.len(), 1);
    let delta = &patch.deltas()[0];
    assert_eq!(delta.kind(), DeltaKind::Change);
    assert_eq!(delta.original(), &Chunk::new(0, chars("ab")));
    assert_eq!(delta.revised(), &Chunk::new(0, chars("cd")));
}

#[test]
fn change_within_context() {
    let original = owned(&["x", "foo", "y"]);
    let revised = owned(&["x", "bar", "y"]);
    let patch = diff(&original, &revised);
    check_unified(
        &original,
        &patch,
        1,
        expect![[r#"
            --- a
            +++ b
            @@ -1,3 +1,3 @@
             x
            -foo
            +bar
             y
        "#]],
    );
    let text = generate_unified_diff("a", "b", &original, &patch, 1).join("\n");
    let parsed = parse_unified_diff(&text).unwrap();
    assert_eq!(parsed.apply(&original).unwrap(), revised);
}

#[test]
fn pure_insert_at_end() {
    let original = owned(&["a", "b"]);
    let revised = owned(&["a", "b", "c"]);
    let patch = diff(&original, &revised);
    assert_eq!(patch.len(), 1);
    let delta = &patch.deltas()[0];
    assert_eq!(delta.kind(), DeltaKind::Insert);
    assert_eq!(delta.original(), &Chunk::new(2, Vec::new()));
    assert_eq!(delta.revised(), &Chunk::new(2, owned(&["c"])));
    check_unified(
        &original,
        &patch,
        1,
        expect![[r#"
            --- a
            +++ b
            @@ -2,1 +2,2 @@
             b
            +c
        "#]],
    );
}

#[test]
fn pure_delete_at_start() {
    let original = owned(&["a", "b", "c"]);
    let revised = owned(&["b", "c"]);
    let patch = diff(&original, &revised);
    assert_eq!(patch.len(), 1);
    let delta = &patch.deltas()[0];
    assert_eq!(delta.kind(), DeltaKind::Delete);
    assert_eq!(delta.original(), &Chunk::new(0, owned(&["a"])));
    check_unified(
        &original,
        &patch,
        1,
        expect![[r#"
            --- a
            +++ b
            @@ -1,2 +1,1 @@
            -a
             b
        "#]],
    );
}

fn numbered_lines(count: usize) -> Vec<String> {
    (1..=count).map(|it| format!("L{it}")).collect()
}

#[test]
fn disjoint_edits_produce_two_hunks() {
    let original = numbered_lines(20);
    let mut revised = original.clone();
    revised[1] = "X".to_string();
    revised[17] = "Y".to_string();
    let patch = diff(&original, &revised);
    check_unified(
        &original,
        &patch,
        1,
        expect![[r#"
            --- a
            +++ b
            @@ -1,3 +1,3 @@
             L1
            -L2
            +X
             L3
            @@ -17,3 +17,3 @@
             L17
            -L18
            +Y
             L19
        "#]],
    );
}

#[test]
fn nearby_edits_coalesce_into_one_hunk() {
    let original = numbered_lines(20);
    let mut revised = original.clone();
    revised[4] = "X".to_string();
    revised[6] = "Y".to_string();
    let patch = diff(&original, &revised);
    check_unified(
        &original,
        &patch,
        2,
        expect![[r#"
            --- a
            +++ b
            @@ -3,7 +3,7 @@
             L3
             L4
            -L5
            +X
             L6
            -L7
            +Y
             L8
             L9
        "#]],
    );
}

#[test]
fn unified_round_trip_across_context_sizes() {
    let cases: Vec<(Vec<String>, Vec<String>)> = vec![
        (owned(ORIGINAL_TEXT), owned(CHANGED_TEXT)),
        (owned(&["x", "foo", "y"]), owned(&["x", "bar", "y"])),
        (owned(&["a", "b"]), owned(&["a", "b", "c"])),
        (owned(&["a", "b", "c"]), owned(&["b", "c"])),
        (chars("xaby"), chars("xbay")),
        (chars("xay"), chars("xaay")),
        (Vec::new(), chars("abc")),
        (chars("abc"), Vec::new()),
        (chars("same"), chars("same")),
    ];
    for engine in DiffEngine::available() {
        for (original, revised) in &cases {
            let patch = engine.diff(original, revised);
            for context_size in 0..=3 {
                let text =
                    generate_unified_diff("a", "b", original, &patch, context_size).join("\n");
                let report =
                    parse_unified_diff_with(engine, ParseOptions::default(), &text).unwrap();
                assert!(report.warnings.is_empty());
                assert_eq!(report.patch, patch, "{engine}, context {context_size}");
                assert_eq!(report.patch.apply(original).unwrap(), *revised);
            }
        }
    }
}

#[test]
fn hunk_headers_match_their_bodies() {
    let original = owned(ORIGINAL_TEXT);
    let changed = owned(CHANGED_TEXT);
    let patch = diff(&original, &changed);
    for context_size in 0..=3 {
        let lines = generate_unified_diff("a", "b", &original, &patch, context_size);
        let mut hunks = 0;
        let mut index = 2;
        while index < lines.len() {
            let header = &lines[index];
            assert!(header.starts_with("@@"), "expected hunk header: {header}");
            hunks += 1;
            let body_start = index + 1;
            let mut body_end = body_start;
            while body_end < lines.len() && !lines[body_end].starts_with("@@") {
                body_end += 1;
            }
            let body = &lines[body_start..body_end];
            let original_count = body
                .iter()
                .filter(|it| it.starts_with(' ') || it.starts_with('-'))
                .count();
            let revised_count = body
                .iter()
                .filter(|it| it.starts_with(' ') || it.starts_with('+'))
                .count();
            let ranges = header
                .strip_prefix("@@ -")
                .and_then(|it| it.strip_suffix(" @@"))
                .and_then(|it| it.split_once(" +"))
                .unwrap();
            let declared_original = ranges.0.split_once(',').unwrap().1;
            let declared_revised = ranges.1.split_once(',').unwrap().1;
            assert_eq!(
                declared_original.parse::<usize>().unwrap(),
                original_count,
                "original count mismatch in {header}"
            );
            assert_eq!(
                declared_revised.parse::<usize>().unwrap(),
                revised_count,
                "revised count mismatch in {header}"
            );
            index = body_end;
        }
        assert!(hunks > 0);
    }
}

#[test]
fn blank_context_lines_are_emitted_as_a_space() {
    let original = owned(&["x", "", "a"]);
    let revised = owned(&["x", "", "b"]);
    let patch = diff(&original, &revised);
    let lines = generate_unified_diff("a", "b", &original, &patch, 3);
    assert!(lines.contains(&" ".to_string()));
    assert!(!lines.contains(&String::new()));

    let text = lines.join("\n");
    assert_eq!(parse_unified_diff(&text).unwrap(), patch);
}

#[test]
fn bare_empty_body_line_parses_as_blank_context() {
    let text = "--- a\n+++ b\n@@ -1,3 +1,3 @@\n x\n\n-a\n+b";
    let patch = parse_unified_diff(text).unwrap();
    let original = owned(&["x", "", "a"]);
    assert_eq!(patch.apply(&original).unwrap(), owned(&["x", "", "b"]));
}

#[test]
fn omitted_counts_default_to_one() {
    let text = "--- a\n+++ b\n@@ -1 +1 @@\n-a\n+b";
    let patch = parse_unified_diff(text).unwrap();
    assert_eq!(patch.len(), 1);
    let delta = &patch.deltas()[0];
    assert_eq!(delta.kind(), DeltaKind::Change);
    assert_eq!(delta.original(), &Chunk::new(0, owned(&["a"])));
    assert_eq!(delta.revised(), &Chunk::new(0, owned(&["b"])));
}

#[test]
fn zero_start_lines_are_clamped() {
    let text = "--- a\n+++ b\n@@ -0,1 +0,1 @@\n-a\n+b";
    let patch = parse_unified_diff(text).unwrap();
    assert_eq!(patch.deltas()[0].original().position(), 0);
    assert_eq!(patch.deltas()[0].revised().position(), 0);
}

#[test]
fn count_mismatch_is_fatal_in_strict_mode() {
    let text = "--- a\n+++ b\n@@ -1,2 +1,3 @@\n x\n-foo\n+bar\n y";
    let error = parse_unified_diff(text).unwrap_err();
    assert_eq!(
        error.message,
        "hunk declares 2 original lines but its body holds 3"
    );
    assert_eq!(error.line_number, 3);
    assert_eq!(error.line, "@@ -1,2 +1,3 @@");
}

#[test]
fn count_mismatch_is_a_warning_in_lenient_mode() {
    let text = "--- a\n+++ b\n@@ -1,2 +1,2 @@\n x\n-foo\n+bar\n y";
    let report = parse_unified_diff_with(
        DiffEngine::instance(),
        ParseOptions { lenient: true },
        text,
    )
    .unwrap();
    // Same payload the strict parser would abort with, once per side.
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(
        report.warnings[0].message,
        "hunk declares 2 original lines but its body holds 3"
    );
    assert_eq!(
        report.warnings[1].message,
        "hunk declares 2 revised lines but its body holds 3"
    );
    assert!(report
        .warnings
        .iter()
        .all(|warning| warning.line_number == 3 && warning.line == "@@ -1,2 +1,2 @@"));

    // The observed counts win: the patch still applies.
    let original = owned(&["x", "foo", "y"]);
    assert_eq!(
        report.patch.apply(&original).unwrap(),
        owned(&["x", "bar", "y"])
    );
}

#[test]
fn unknown_body_prefix_is_rejected() {
    let text = "--- a\n+++ b\n@@ -1,1 +1,1 @@\n*boom";
    let error = parse_unified_diff(text).unwrap_err();
    assert_eq!(error.message, "unexpected line prefix '*'");
    assert_eq!(error.line_number, 4);
    assert_eq!(error.line, "*boom");
}

#[test]
fn body_lines_outside_a_hunk_are_rejected() {
    let text = "--- a\n+++ b\n stray context";
    let error = parse_unified_diff(text).unwrap_err();
    assert_eq!(error.message, "diff body line outside of any hunk");
    assert_eq!(error.line_number, 3);
}

#[test]
fn prelude_is_skipped() {
    let text = "diff --git a/f b/f\nindex 000..111\n--- a/f\n+++ b/f\n@@ -1,1 +1,1 @@\n-a\n+b";
    let patch = parse_unified_diff(text).unwrap();
    assert_eq!(patch.len(), 1);

    // Without a +++ marker everything is prelude.
    assert!(parse_unified_diff("no diff here").unwrap().is_empty());
}

#[test]
fn add_delta_keeps_the_patch_sorted() {
    let mut patch = Patch::new();
    patch.add_delta(Delta::new(
        Chunk::new(7, owned(&["h"])),
        Chunk::new(7, owned(&["H"])),
    ));
    patch.add_delta(Delta::new(
        Chunk::new(0, owned(&["a"])),
        Chunk::new(0, owned(&["A"])),
    ));
    patch.add_delta(Delta::new(
        Chunk::new(3, owned(&["d"])),
        Chunk::new(3, owned(&["D"])),
    ));
    let positions: Vec<usize> = patch
        .deltas()
        .iter()
        .map(|delta| delta.original().position())
        .collect();
    assert_eq!(positions, [0, 3, 7]);
}

#[test]
fn apply_reports_mismatched_content() {
    let patch = diff(&owned(&["a", "b"]), &owned(&["a", "x"]));
    let error = apply_patch(&owned(&["a", "c"]), &patch).unwrap_err();
    assert_eq!(
        error,
        PatchError::ContentMismatch {
            index: 1,
            expected: "\"b\"".to_string(),
            actual: "\"c\"".to_string(),
        }
    );
}

#[test]
fn apply_reports_out_of_bounds_chunks() {
    let patch = diff(&owned(&["a", "b"]), &owned(&["a", "x"]));
    let error = apply_patch(&owned(&["a"]), &patch).unwrap_err();
    assert_eq!(
        error,
        PatchError::ChunkOutOfBounds {
            position: 1,
            size: 1,
            target_len: 1,
        }
    );
}

#[test]
fn restore_verifies_the_revised_chunk() {
    let patch = diff(&owned(&["a", "b"]), &owned(&["a", "x"]));
    let error = undo_patch(&owned(&["a", "zzz"]), &patch).unwrap_err();
    assert_eq!(
        error,
        PatchError::ContentMismatch {
            index: 1,
            expected: "\"x\"".to_string(),
            actual: "\"zzz\"".to_string(),
        }
    );
}

#[test]
fn chunk_level_diff_is_reanchored() {
    let original = Chunk::new(10, owned(&["a", "b"]));
    let revised = Chunk::new(20, owned(&["a", "c"]));
    let deltas = DiffEngine::instance().diff_chunks(&original, &revised);
    assert_eq!(deltas.len(), 1);
    assert_eq!(deltas[0].original(), &Chunk::new(11, owned(&["b"])));
    assert_eq!(deltas[0].revised(), &Chunk::new(21, owned(&["c"])));

    assert_eq!(diff_chunks(&original, &revised), deltas);
}

#[test]
fn chunk_geometry() {
    let chunk = Chunk::new(2, owned(&["a", "b", "c"]));
    assert_eq!(chunk.size(), 3);
    assert_eq!(chunk.last(), 4);
    assert!(!chunk.is_empty());

    let empty: Chunk<String> = Chunk::new(5, Vec::new());
    assert_eq!(empty.size(), 0);
    assert_eq!(empty.last(), 4);
    assert!(empty.is_empty());
}

#[test]
fn engine_registry() {
    let native = DiffEngine::create(None, true).unwrap();
    assert_eq!(native.name(), "native-myers");
    assert!(native.hash_optimization());
    assert_eq!(native.to_string(), "NativeMyersDiffEngine");

    // Declining hash optimization without naming an engine falls back to the
    // reference engine; naming the native engine makes it an error.
    let plain = DiffEngine::create(None, false).unwrap();
    assert_eq!(plain.name(), "plain-myers");
    assert!(!plain.hash_optimization());
    assert_eq!(
        DiffEngine::create(Some("native"), false),
        Err(EngineError::HashOptimizationForced)
    );

    for name in ["plain", "plain-myers", "native", "native-myers"] {
        DiffEngine::create(Some(name), true).unwrap();
    }
    assert_eq!(
        DiffEngine::create(Some("histogram"), true),
        Err(EngineError::UnknownEngine("histogram".to_string()))
    );

    let available = DiffEngine::available();
    let names: Vec<&str> = available.iter().map(DiffEngine::name).collect();
    assert_eq!(names, ["native-myers", "plain-myers", "plain-myers"]);
    assert!(available[1].hash_optimization() && !available[2].hash_optimization());

    assert_eq!(DiffEngine::instance().name(), "native-myers");
}

#[test]
fn split_lines_strips_terminators() {
    assert_eq!(split_lines("a\r\nb\nc"), owned(&["a", "b", "c"]));
    assert_eq!(split_lines("a\n"), owned(&["a"]));
    assert_eq!(split_lines("a\n\nb"), owned(&["a", "", "b"]));
    assert!(split_lines("").is_empty());
}
