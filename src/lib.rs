#![warn(missing_docs)]
//! Unipatch computes the differences between two sequences, carries them as
//! a patch with deterministic apply/restore semantics, and round-trips that
//! patch through the unified-diff text format read and written by `git diff`
//! and `diff -u`/`patch`.
//!
//! The diff itself is the greedy variant of [Myers' `O((N+M)D)`
//! algorithm](http://www.xmailserver.org/diff2.pdf): the resulting patch is
//! minimal in the number of inserted plus deleted elements, and applying it
//! to the original sequence reproduces the revised sequence exactly.
//! Sequences can hold anything cloneable that implements equality and
//! hashing — typically text lines, but any [`Element`] works.
//!
//! # API Overview
//!
//! ## Computing and applying patches
//!
//! Text is split into diffable lines with [`split_lines`] (terminators are
//! stripped; the element convention throughout the crate). [`diff`] computes
//! a [`Patch`], [`apply_patch`] replays it, and [`undo_patch`] rolls a
//! patched sequence back:
//!
//! ```
//! use unipatch::{apply_patch, diff, split_lines, undo_patch};
//!
//! let original = split_lines("a\nb\nc");
//! let revised = split_lines("a\nx\nc");
//!
//! let patch = diff(&original, &revised);
//! assert_eq!(patch.len(), 1);
//! assert_eq!(apply_patch(&original, &patch).unwrap(), revised);
//! assert_eq!(undo_patch(&revised, &patch).unwrap(), original);
//! ```
//!
//! A patch that no longer matches its target reports which element got in
//! the way instead of applying partially; see [`PatchError`].
//!
//! ## Unified-diff text
//!
//! [`generate_unified_diff`] serializes a patch together with the original
//! sequence, batching nearby deltas under shared hunk headers;
//! [`parse_unified_diff`] reads the text back into the equivalent patch:
//!
//! ```
//! use unipatch::{diff, generate_unified_diff, parse_unified_diff, split_lines};
//!
//! let original = split_lines("one\ntwo\nthree");
//! let revised = split_lines("one\n2\nthree");
//! let patch = diff(&original, &revised);
//!
//! let text = generate_unified_diff("a", "b", &original, &patch, 1).join("\n");
//! assert_eq!(
//!     text,
//!     "--- a\n+++ b\n@@ -1,3 +1,3 @@\n one\n-two\n+2\n three"
//! );
//! assert_eq!(parse_unified_diff(&text).unwrap(), patch);
//! ```
//!
//! Parsing is strict by default: hunk headers whose line counts disagree
//! with the hunk body abort with a [`FormatError`]. Pass
//! [`ParseOptions`] `{ lenient: true }` to
//! [`parse_unified_diff_with`] to downgrade violations to warnings and trust
//! the observed counts instead.
//!
//! ## Engines
//!
//! The work is done by a [`DiffEngine`]. The reference engine (`"plain"`)
//! compares elements directly and can precompute 64-bit hashes to cheapen
//! the comparisons; the accelerated engine (`"native"`) interns all elements
//! into integer tokens up front. Both produce identical patches. The
//! top-level functions use [`DiffEngine::instance`], a process-wide default
//! initialized once; tests and callers with special needs construct engines
//! directly:
//!
//! ```
//! use unipatch::DiffEngine;
//!
//! let engine = DiffEngine::create(Some("plain"), false).unwrap();
//! let patch = engine.diff(&["a", "b"], &["a", "c"]);
//! assert_eq!(patch.len(), 1);
//! ```

use std::fmt::Debug;
use std::hash::Hash;

pub use engine::{DiffEngine, EngineError};
pub use patch::{Chunk, Delta, DeltaKind, Patch, PatchError};
pub use sources::{lines, split_lines, Lines};
pub use unified::{
    generate_unified_diff, parse_unified_diff, parse_unified_diff_with, FormatError, ParseOptions,
    ParseReport,
};

mod engine;
mod intern;
mod myers;
mod patch;
pub mod sources;
mod unified;

#[cfg(test)]
mod tests;

/// A single unit of a diffed sequence, typically a text line.
///
/// Equality is what correctness rests on; hashing only accelerates matching
/// and never changes a result. `Debug` feeds the diagnostics of failed
/// patch applications. Implemented for every type with those capabilities.
pub trait Element: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Element for T {}

/// Computes the patch turning `original` into `revised` with the default
/// engine.
pub fn diff<T: Element>(original: &[T], revised: &[T]) -> Patch<T> {
    DiffEngine::instance().diff(original, revised)
}

/// Diffs the contents of two chunks with the default engine, re-anchored at
/// the chunks' host positions. See [`DiffEngine::diff_chunks`].
pub fn diff_chunks<T: Element>(original: &Chunk<T>, revised: &Chunk<T>) -> Vec<Delta<T>> {
    DiffEngine::instance().diff_chunks(original, revised)
}

/// Applies `patch` to a copy of `original`, returning the revised sequence.
pub fn apply_patch<T: Element>(original: &[T], patch: &Patch<T>) -> Result<Vec<T>, PatchError> {
    patch.apply(original)
}

/// Undoes `patch` on a copy of `revised`, recovering the original sequence.
pub fn undo_patch<T: Element>(revised: &[T], patch: &Patch<T>) -> Result<Vec<T>, PatchError> {
    patch.restore(revised)
}
