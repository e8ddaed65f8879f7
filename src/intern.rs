//! Interning support for the accelerated engine.
//!
//! Equal elements are mapped to the same `u32` token, so the Myers search
//! can compare plain integers instead of rehashing or re-comparing element
//! data on every snake extension. Interning amortizes the hash/equality cost
//! to once per distinct element.

use ahash::RandomState;
use hashbrown::raw::RawTable;

use crate::Element;

/// Maps elements to dense `u32` tokens; equal elements share a token.
struct Interner<T> {
    elements: Vec<T>,
    table: RawTable<u32>,
    hasher: RandomState,
}

impl<T: Element> Interner<T> {
    fn with_capacity(capacity: usize) -> Interner<T> {
        Interner {
            elements: Vec::with_capacity(capacity),
            table: RawTable::with_capacity(capacity),
            hasher: RandomState::new(),
        }
    }

    fn intern(&mut self, element: &T) -> u32 {
        let hash = self.hasher.hash_one(element);
        if let Some(&token) = self
            .table
            .get(hash, |&it| &self.elements[it as usize] == element)
        {
            token
        } else {
            let token = self.elements.len() as u32;
            self.table.insert(hash, token, |&it| {
                self.hasher.hash_one(&self.elements[it as usize])
            });
            self.elements.push(element.clone());
            token
        }
    }
}

/// Interns both sides of a diff with a shared token space.
pub(crate) fn intern_pair<T: Element>(original: &[T], revised: &[T]) -> (Vec<u32>, Vec<u32>) {
    let mut interner = Interner::with_capacity(original.len() + revised.len());
    let original_tokens = original.iter().map(|it| interner.intern(it)).collect();
    let revised_tokens = revised.iter().map(|it| interner.intern(it)).collect();
    (original_tokens, revised_tokens)
}
