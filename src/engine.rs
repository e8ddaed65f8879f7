//! Engine selection.
//!
//! Two engines compute diffs: the reference engine (`"plain"`) compares
//! elements directly, optionally guarded by a precomputed hash, and the
//! accelerated engine (`"native"`) interns elements into integer tokens
//! before searching. Both produce byte-identical output; they differ only in
//! how element equality is evaluated during the search.

use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

use crate::patch::{Chunk, Delta, Patch};
use crate::{myers, Element};

/// Error raised by [`DiffEngine::create`] for an unsupported configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown engine: {0}")]
    UnknownEngine(String),
    #[error("hash optimization is always enabled with the native engine")]
    HashOptimizationForced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EngineKind {
    Plain,
    Native,
}

/// A configured diff engine.
///
/// Engines are stateless values: they hold no caches and are freely shared
/// across threads. Construct one with [`DiffEngine::create`], or use the
/// process-wide default via [`DiffEngine::instance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiffEngine {
    kind: EngineKind,
    hash_optimization: bool,
}

impl DiffEngine {
    /// Creates an engine by name.
    ///
    /// Recognized names are `"plain"` and `"native"` plus their explicit
    /// Myers aliases `"plain-myers"` and `"native-myers"`. With no name the
    /// accelerated engine is selected. The accelerated engine always hashes,
    /// so explicitly requesting it with `hash_optimization == false` is
    /// rejected; an anonymous request without hashing falls back to the
    /// reference engine instead.
    pub fn create(name: Option<&str>, hash_optimization: bool) -> Result<DiffEngine, EngineError> {
        match name {
            Some("native") | Some("native-myers") => {
                if !hash_optimization {
                    return Err(EngineError::HashOptimizationForced);
                }
                Ok(DiffEngine {
                    kind: EngineKind::Native,
                    hash_optimization: true,
                })
            }
            Some("plain") | Some("plain-myers") => Ok(DiffEngine {
                kind: EngineKind::Plain,
                hash_optimization,
            }),
            Some(other) => Err(EngineError::UnknownEngine(other.to_owned())),
            None if hash_optimization => Ok(DiffEngine {
                kind: EngineKind::Native,
                hash_optimization: true,
            }),
            None => Ok(DiffEngine {
                kind: EngineKind::Plain,
                hash_optimization: false,
            }),
        }
    }

    /// The process-wide default engine, initialized on first use.
    pub fn instance() -> &'static DiffEngine {
        static INSTANCE: OnceLock<DiffEngine> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            DiffEngine::create(None, true).expect("the default engine is always constructible")
        })
    }

    /// All engine configurations, fastest first.
    pub fn available() -> &'static [DiffEngine] {
        static AVAILABLE: OnceLock<[DiffEngine; 3]> = OnceLock::new();
        AVAILABLE.get_or_init(|| {
            [
                DiffEngine {
                    kind: EngineKind::Native,
                    hash_optimization: true,
                },
                DiffEngine {
                    kind: EngineKind::Plain,
                    hash_optimization: true,
                },
                DiffEngine {
                    kind: EngineKind::Plain,
                    hash_optimization: false,
                },
            ]
        })
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            EngineKind::Plain => "plain-myers",
            EngineKind::Native => "native-myers",
        }
    }

    pub fn hash_optimization(&self) -> bool {
        self.hash_optimization
    }

    /// Computes the patch that transforms `original` into `revised`.
    ///
    /// The result is minimal in the total number of inserted plus deleted
    /// elements, and deterministic: every engine configuration produces the
    /// same patch for the same inputs.
    pub fn diff<T: Element>(&self, original: &[T], revised: &[T]) -> Patch<T> {
        match self.kind {
            EngineKind::Plain => myers::diff(original, revised, self.hash_optimization),
            EngineKind::Native => myers::diff_interned(original, revised),
        }
    }

    /// Diffs the contents of two chunks, re-anchoring the resulting deltas at
    /// the chunks' positions in their host sequences. Returned in patch
    /// order.
    pub fn diff_chunks<T: Element>(
        &self,
        original: &Chunk<T>,
        revised: &Chunk<T>,
    ) -> Vec<Delta<T>> {
        self.diff(original.lines(), revised.lines())
            .into_deltas()
            .into_iter()
            .map(|delta| delta.shift(original.position(), revised.position()))
            .collect()
    }
}

impl fmt::Display for DiffEngine {
    /// Renders the engine title, e.g. `NativeMyersDiffEngine`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in self.name().split('-') {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str())?;
            }
        }
        f.write_str("DiffEngine")
    }
}
