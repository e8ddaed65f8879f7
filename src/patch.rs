use std::fmt;

use thiserror::Error;

use crate::Element;

/// Error returned when a [`Patch`] cannot be applied to (or removed from) a
/// target sequence.
///
/// Verification happens against a private copy of the target, so a failed
/// apply or restore never leaves partial edits behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// A chunk is anchored past the end of the target sequence.
    #[error("chunk reaches past the end of the target: position {position} + size {size} > target length {target_len}")]
    ChunkOutOfBounds {
        /// 0-based anchor of the offending chunk.
        position: usize,
        /// Number of lines the chunk claims at that anchor.
        size: usize,
        /// Length of the sequence the chunk was verified against.
        target_len: usize,
    },
    /// The target sequence does not contain the chunk's saved content.
    #[error("chunk content {expected} does not match the target {actual} at index {index}")]
    ContentMismatch {
        /// 0-based index into the target where the mismatch was found.
        index: usize,
        /// Debug rendering of the element the chunk expected.
        expected: String,
        /// Debug rendering of the element the target actually holds.
        actual: String,
    },
}

/// A contiguous slice of a host sequence: a 0-based `position` plus the lines
/// found there.
///
/// Chunks save a copy of the affected lines so that a [`Delta`] can later
/// verify the target still looks the way it did when the diff was computed.
/// They are immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chunk<T> {
    position: usize,
    lines: Vec<T>,
}

impl<T: Element> Chunk<T> {
    pub fn new(position: usize, lines: Vec<T>) -> Chunk<T> {
        Chunk { position, lines }
    }

    /// 0-based index of the first line in the host sequence.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn lines(&self) -> &[T] {
        &self.lines
    }

    pub fn size(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the last line covered by this chunk. For an empty chunk this
    /// is the index just before `position`.
    pub fn last(&self) -> usize {
        (self.position + self.lines.len()).saturating_sub(1)
    }

    /// Checks that `target` still contains this chunk's saved lines at
    /// `position`.
    pub fn verify(&self, target: &[T]) -> Result<(), PatchError> {
        if self.position + self.lines.len() > target.len() {
            return Err(PatchError::ChunkOutOfBounds {
                position: self.position,
                size: self.lines.len(),
                target_len: target.len(),
            });
        }
        for (offset, expected) in self.lines.iter().enumerate() {
            let index = self.position + offset;
            let actual = &target[index];
            if actual != expected {
                return Err(PatchError::ContentMismatch {
                    index,
                    expected: format!("{expected:?}"),
                    actual: format!("{actual:?}"),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn shift(self, offset: usize) -> Chunk<T> {
        Chunk {
            position: self.position + offset,
            lines: self.lines,
        }
    }
}

/// Classification of a [`Delta`] by which of its chunks carry lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeltaKind {
    /// Lines only added: the original chunk is empty.
    Insert,
    /// Lines only removed: the revised chunk is empty.
    Delete,
    /// Lines replaced: both chunks carry content.
    Change,
}

/// One minimal edit: a pair of chunks naming what a region of the original
/// sequence becomes in the revised sequence.
///
/// The three kinds share their verify/apply/restore logic; the tag only
/// records which side of the pair is empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delta<T> {
    kind: DeltaKind,
    original: Chunk<T>,
    revised: Chunk<T>,
}

impl<T: Element> Delta<T> {
    /// Pairs two chunks and classifies the edit from their sizes.
    pub fn new(original: Chunk<T>, revised: Chunk<T>) -> Delta<T> {
        let kind = if original.is_empty() && !revised.is_empty() {
            DeltaKind::Insert
        } else if !original.is_empty() && revised.is_empty() {
            DeltaKind::Delete
        } else {
            DeltaKind::Change
        };
        Delta {
            kind,
            original,
            revised,
        }
    }

    pub fn kind(&self) -> DeltaKind {
        self.kind
    }

    /// The chunk this delta replaces in the original sequence.
    pub fn original(&self) -> &Chunk<T> {
        &self.original
    }

    /// The chunk this delta produces in the revised sequence.
    pub fn revised(&self) -> &Chunk<T> {
        &self.revised
    }

    /// Checks that this delta can be applied to `target`.
    pub fn verify(&self, target: &[T]) -> Result<(), PatchError> {
        self.original.verify(target)
    }

    /// Replaces the original chunk's region of `target` with the revised
    /// lines.
    pub fn apply_to(&self, target: &mut Vec<T>) -> Result<(), PatchError> {
        self.verify(target)?;
        let start = self.original.position();
        let end = start + self.original.size();
        target.splice(start..end, self.revised.lines().iter().cloned());
        Ok(())
    }

    /// Undoes this delta on an already patched sequence, anchoring on the
    /// revised chunk.
    pub fn restore_to(&self, target: &mut Vec<T>) -> Result<(), PatchError> {
        self.revised.verify(target)?;
        let start = self.revised.position();
        let end = start + self.revised.size();
        target.splice(start..end, self.original.lines().iter().cloned());
        Ok(())
    }

    pub(crate) fn shift(self, original_offset: usize, revised_offset: usize) -> Delta<T> {
        Delta {
            kind: self.kind,
            original: self.original.shift(original_offset),
            revised: self.revised.shift(revised_offset),
        }
    }
}

impl<T: Element> fmt::Display for Delta<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} delta @ -{},{} +{},{}",
            self.kind,
            self.original.position(),
            self.original.size(),
            self.revised.position(),
            self.revised.size(),
        )
    }
}

/// All deltas between an original and a revised sequence, ordered ascending
/// by original position.
///
/// A patch is built up through [`Patch::add_delta`] and treated as immutable
/// once handed to apply/restore/serialize. The ordering invariant is
/// maintained across every insertion, so readers always observe a sorted,
/// non-overlapping sequence of edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch<T> {
    deltas: Vec<Delta<T>>,
}

impl<T> Default for Patch<T> {
    fn default() -> Patch<T> {
        Patch { deltas: Vec::new() }
    }
}

impl<T: Element> Patch<T> {
    pub fn new() -> Patch<T> {
        Patch::default()
    }

    /// Builds a patch from deltas that are already sorted by original
    /// position, as produced by the diff engine's backtrack.
    pub(crate) fn from_sorted_deltas(deltas: Vec<Delta<T>>) -> Patch<T> {
        debug_assert!(
            deltas
                .windows(2)
                .all(|pair| pair[0].original().position() <= pair[1].original().position()),
            "diff engine emitted deltas out of order"
        );
        Patch { deltas }
    }

    /// Inserts `delta` at its sorted position. Insertion order is preserved
    /// among deltas anchored at the same position.
    pub fn add_delta(&mut self, delta: Delta<T>) {
        let position = delta.original().position();
        let at = self
            .deltas
            .partition_point(|it| it.original().position() <= position);
        self.deltas.insert(at, delta);
    }

    /// The deltas in ascending original-position order.
    pub fn deltas(&self) -> &[Delta<T>] {
        &self.deltas
    }

    pub(crate) fn into_deltas(self) -> Vec<Delta<T>> {
        self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Applies every delta to a copy of `target` and returns the revised
    /// sequence.
    ///
    /// Deltas run in reverse order so that earlier positions stay valid while
    /// later regions are spliced.
    pub fn apply(&self, target: &[T]) -> Result<Vec<T>, PatchError> {
        let mut result = target.to_vec();
        for delta in self.deltas.iter().rev() {
            delta.apply_to(&mut result)?;
        }
        Ok(result)
    }

    /// Undoes every delta on a copy of the patched sequence, recovering the
    /// original. The inverse of [`Patch::apply`].
    pub fn restore(&self, target: &[T]) -> Result<Vec<T>, PatchError> {
        let mut result = target.to_vec();
        for delta in self.deltas.iter().rev() {
            delta.restore_to(&mut result)?;
        }
        Ok(result)
    }
}
