#![no_main]

use libfuzzer_sys::fuzz_target;

use libfuzzer_sys::arbitrary;
use unipatch::{generate_unified_diff, parse_unified_diff_with, DiffEngine, ParseOptions};

#[derive(arbitrary::Arbitrary, Debug)]
struct Input {
    original: Vec<String>,
    revised: Vec<String>,
}

/// Checks the core invariants on arbitrary sequences with every engine:
/// - applying the diff reproduces the revised sequence
/// - restoring it reproduces the original
/// - the unified-diff text round-trips through the parser
fn do_fuzz(Input { original, revised }: Input) {
    // The unified format carries one element per line; elements containing
    // line breaks are outside the element convention.
    if original
        .iter()
        .chain(&revised)
        .any(|line| line.contains('\n') || line.contains('\r'))
    {
        return;
    }

    for engine in DiffEngine::available() {
        let patch = engine.diff(&original, &revised);
        assert_eq!(patch.apply(&original).unwrap(), revised);
        assert_eq!(patch.restore(&revised).unwrap(), original);

        let text = generate_unified_diff("a", "b", &original, &patch, 3).join("\n");
        let report = parse_unified_diff_with(engine, ParseOptions::default(), &text).unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.patch, patch);
        assert_eq!(report.patch.apply(&original).unwrap(), revised);
    }
}

fuzz_target!(|input: Input| {
    do_fuzz(input);
});
