#![no_main]

use libfuzzer_sys::fuzz_target;

use unipatch::{parse_unified_diff, parse_unified_diff_with, DiffEngine, ParseOptions};

fuzz_target!(|text: &str| {
    // Strict parsing may reject the input but must never panic.
    let _ = parse_unified_diff(text);

    // Lenient parsing downgrades every violation, so it always succeeds.
    let report = parse_unified_diff_with(
        DiffEngine::instance(),
        ParseOptions { lenient: true },
        text,
    )
    .unwrap();
    let _ = report.patch.len();
});
