//! Unified-diff serialization and parsing.
//!
//! The emitter turns a [`Patch`] plus the original sequence into the line
//! format printed by `git diff` or `diff -u`; the parser reads that format
//! back, reconstructing the minimal deltas of every hunk through the diff
//! engine so that `parse(emit(patch))` yields the patch it started from.

use std::fmt::Display;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::engine::DiffEngine;
use crate::patch::{Chunk, Delta, Patch};
use crate::Element;

/// A violation of the unified-diff format.
///
/// In strict mode this aborts the parse; in lenient mode the same payload is
/// collected as a warning and parsing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed unified diff at line {line_number}: {message}")]
pub struct FormatError {
    pub message: String,
    /// 1-based line number in the parsed text.
    pub line_number: usize,
    /// The offending line, terminator stripped.
    pub line: String,
}

/// Converts `patch` into unified-diff format.
///
/// Returns one `String` per output line, without terminators; an empty patch
/// produces no output at all. `original` must be the sequence the patch was
/// computed from, since context lines are copied out of it. Deltas closer
/// together than twice `context_size` share a hunk.
pub fn generate_unified_diff<T>(
    original_name: &str,
    revised_name: &str,
    original: &[T],
    patch: &Patch<T>,
    context_size: usize,
) -> Vec<String>
where
    T: Element + Display,
{
    let deltas = patch.deltas();
    if deltas.is_empty() {
        return Vec::new();
    }

    let mut result = vec![format!("--- {original_name}"), format!("+++ {revised_name}")];

    let mut batch = vec![&deltas[0]];
    for next in &deltas[1..] {
        let last = batch[batch.len() - 1].original();
        // Written additively to sidestep underflow; this is
        // `last.position + last.size + C >= next.position - C`.
        if last.position() + last.size() + 2 * context_size >= next.original().position() {
            batch.push(next);
        } else {
            result.extend(process_batch(original, &batch, context_size));
            batch.clear();
            batch.push(next);
        }
    }
    result.extend(process_batch(original, &batch, context_size));

    result
}

/// Emits one hunk: leading context, the batched deltas with the original
/// lines between them as context, trailing context, and the `@@` header
/// carrying the running totals.
fn process_batch<T>(original: &[T], batch: &[&Delta<T>], context_size: usize) -> Vec<String>
where
    T: Element + Display,
{
    let mut buffer = Vec::new();
    let mut original_total = 0;
    let mut revised_total = 0;

    let first = batch[0];
    // The +1 turns the 0-based chunk position into a 1-based line number.
    let original_start = (first.original().position() + 1)
        .saturating_sub(context_size)
        .max(1);
    let revised_start = (first.revised().position() + 1)
        .saturating_sub(context_size)
        .max(1);

    let context_start = first.original().position().saturating_sub(context_size);
    for line in &original[context_start..first.original().position()] {
        buffer.push(format!(" {line}"));
        original_total += 1;
        revised_total += 1;
    }

    let mut delta = first;
    push_delta_lines(delta, &mut buffer);
    original_total += delta.original().size();
    revised_total += delta.revised().size();

    for &next in &batch[1..] {
        let intermediate_start = delta.original().position() + delta.original().size();
        for line in &original[intermediate_start..next.original().position()] {
            buffer.push(format!(" {line}"));
            original_total += 1;
            revised_total += 1;
        }
        push_delta_lines(next, &mut buffer);
        original_total += next.original().size();
        revised_total += next.revised().size();
        delta = next;
    }

    let trailing_start = delta.original().position() + delta.original().size();
    let trailing_end = (trailing_start + context_size).min(original.len());
    for line in &original[trailing_start..trailing_end] {
        buffer.push(format!(" {line}"));
        original_total += 1;
        revised_total += 1;
    }

    buffer.insert(
        0,
        format!("@@ -{original_start},{original_total} +{revised_start},{revised_total} @@"),
    );
    buffer
}

fn push_delta_lines<T>(delta: &Delta<T>, buffer: &mut Vec<String>)
where
    T: Element + Display,
{
    for line in delta.original().lines() {
        buffer.push(format!("-{line}"));
    }
    for line in delta.revised().lines() {
        buffer.push(format!("+{line}"));
    }
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Downgrade format violations to warnings and keep parsing, taking the
    /// observed body line counts as authoritative.
    pub lenient: bool,
}

/// A successfully parsed patch plus any violations downgraded to warnings in
/// lenient mode. Strict parses always come back with an empty warning list.
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub patch: Patch<String>,
    pub warnings: Vec<FormatError>,
}

/// Parses a unified diff with the default engine in strict mode.
pub fn parse_unified_diff(text: &str) -> Result<Patch<String>, FormatError> {
    parse_unified_diff_with(DiffEngine::instance(), ParseOptions::default(), text)
        .map(|report| report.patch)
}

/// Parses a unified diff into a [`Patch`], reconstructing each hunk's deltas
/// through `engine`.
///
/// Everything up to and including the `+++` file header is skipped. Hunk
/// headers must carry line counts matching their body; in strict mode a
/// mismatch (or an unrecognized body line) aborts with a [`FormatError`]
/// naming the offending line.
pub fn parse_unified_diff_with(
    engine: &DiffEngine,
    options: ParseOptions,
    text: &str,
) -> Result<ParseReport, FormatError> {
    let parser = Parser {
        engine,
        lenient: options.lenient,
        patch: Patch::new(),
        warnings: Vec::new(),
    };
    parser.parse(text)
}

fn hunk_header() -> &'static Regex {
    static HUNK_HEADER: OnceLock<Regex> = OnceLock::new();
    HUNK_HEADER.get_or_init(|| {
        Regex::new(r"^@@\s+-(\d+)(?:,(\d+))?\s+\+(\d+)(?:,(\d+))?\s+@@$")
            .expect("hunk header pattern is valid")
    })
}

/// One hunk as read off the wire, before its deltas are reconstructed.
struct RawHunk {
    /// 1-based position of the `@@` header line, for diagnostics.
    line_number: usize,
    header: String,
    old_ln: usize,
    old_count: Option<usize>,
    new_ln: usize,
    new_count: Option<usize>,
    /// Tag byte (`' '`, `'+'` or `'-'`) plus line content.
    body: Vec<(u8, String)>,
}

struct Parser<'a> {
    engine: &'a DiffEngine,
    lenient: bool,
    patch: Patch<String>,
    warnings: Vec<FormatError>,
}

impl Parser<'_> {
    fn parse(mut self, text: &str) -> Result<ParseReport, FormatError> {
        let mut in_prelude = true;
        let mut hunk: Option<RawHunk> = None;

        for (index, line) in crate::sources::lines(text).enumerate() {
            let line_number = index + 1;

            if in_prelude {
                if line.starts_with("+++") {
                    in_prelude = false;
                }
                continue;
            }

            if let Some(captures) = hunk_header().captures(line) {
                if let Some(done) = hunk.take() {
                    self.finish_hunk(done)?;
                }
                let parse = |group: usize| -> Option<Result<usize, std::num::ParseIntError>> {
                    captures.get(group).map(|m| m.as_str().parse())
                };
                let numbers = (|| {
                    Ok::<_, std::num::ParseIntError>((
                        parse(1).expect("start group always captures")?,
                        parse(2).transpose()?,
                        parse(3).expect("start group always captures")?,
                        parse(4).transpose()?,
                    ))
                })();
                match numbers {
                    Ok((old_ln, old_count, new_ln, new_count)) => {
                        hunk = Some(RawHunk {
                            line_number,
                            header: line.to_owned(),
                            old_ln,
                            old_count,
                            new_ln,
                            new_count,
                            body: Vec::new(),
                        });
                    }
                    Err(_) => {
                        self.violation("hunk header number out of range", line_number, line)?;
                    }
                }
                continue;
            }

            let Some(current) = hunk.as_mut() else {
                self.violation("diff body line outside of any hunk", line_number, line)?;
                continue;
            };
            if line.is_empty() {
                // A bare empty line counts as context with empty content.
                current.body.push((b' ', String::new()));
                continue;
            }
            match line.as_bytes()[0] {
                tag @ (b' ' | b'+' | b'-') => current.body.push((tag, line[1..].to_owned())),
                other => {
                    self.violation(
                        format!("unexpected line prefix {:?}", other as char),
                        line_number,
                        line,
                    )?;
                }
            }
        }

        if let Some(done) = hunk.take() {
            self.finish_hunk(done)?;
        }
        Ok(ParseReport {
            patch: self.patch,
            warnings: self.warnings,
        })
    }

    /// Splits the accumulated hunk body into its original and revised lines,
    /// checks them against the header's declared counts, and rebuilds the
    /// hunk's deltas through the engine.
    fn finish_hunk(&mut self, hunk: RawHunk) -> Result<(), FormatError> {
        if hunk.body.is_empty() {
            return Ok(());
        }

        let select = |wanted: u8| {
            hunk.body
                .iter()
                .filter(|&&(tag, _)| tag == b' ' || tag == wanted)
                .map(|(_, content)| content.clone())
                .collect::<Vec<String>>()
        };
        let original_lines = select(b'-');
        let revised_lines = select(b'+');

        // Omitted counts default to 1 on input.
        let declared_original = hunk.old_count.unwrap_or(1);
        let declared_revised = hunk.new_count.unwrap_or(1);
        if original_lines.len() != declared_original {
            self.violation(
                format!(
                    "hunk declares {declared_original} original lines but its body holds {}",
                    original_lines.len()
                ),
                hunk.line_number,
                &hunk.header,
            )?;
        }
        if revised_lines.len() != declared_revised {
            self.violation(
                format!(
                    "hunk declares {declared_revised} revised lines but its body holds {}",
                    revised_lines.len()
                ),
                hunk.line_number,
                &hunk.header,
            )?;
        }

        let old_ln = hunk.old_ln.max(1);
        let new_ln = hunk.new_ln.max(1);
        let deltas = self.engine.diff_chunks(
            &Chunk::new(old_ln - 1, original_lines),
            &Chunk::new(new_ln - 1, revised_lines),
        );
        for delta in deltas {
            self.patch.add_delta(delta);
        }
        Ok(())
    }

    fn violation(
        &mut self,
        message: impl Into<String>,
        line_number: usize,
        line: &str,
    ) -> Result<(), FormatError> {
        let error = FormatError {
            message: message.into(),
            line_number,
            line: line.to_owned(),
        };
        if self.lenient {
            log::warn!("{error}");
            self.warnings.push(error);
            Ok(())
        } else {
            Err(error)
        }
    }
}
