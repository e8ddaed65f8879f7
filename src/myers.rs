//! The greedy variant of [Myers' `O((N+M)D)` algorithm](http://www.xmailserver.org/diff2.pdf).
//!
//! The search walks a diagonal frontier until it reaches the far corner of
//! the edit graph, threading a path of [`PathNode`]s back toward the origin.
//! Runs of matching elements ("snakes") are collapsed into single nodes so
//! the backtrack can skip them in O(1) via the `last_snake` links, and the
//! chain of nodes between two snakes collapses into a single [`Delta`].

use ahash::RandomState;

use crate::intern::intern_pair;
use crate::patch::{Chunk, Delta, Patch};
use crate::Element;

/// Sentinel for "no node"; the arena never grows anywhere near this many
/// nodes because input lengths are capped at `i32::MAX`.
const NONE: u32 = u32::MAX;

/// A node in the edit graph at grid coordinates `(i, j)`.
///
/// `prev` links toward the origin, skipping chains of non-diagonal moves.
/// `last_snake` memoizes the nearest snake ancestor (or the node itself when
/// it anchors the path) so the backtrack never rescans a snake run.
struct PathNode {
    i: i32,
    j: i32,
    prev: u32,
    last_snake: u32,
    snake: bool,
}

/// Append-only arena holding every node reachable from the frontier.
#[derive(Default)]
struct PathArena {
    nodes: Vec<PathNode>,
}

impl PathArena {
    fn i(&self, id: u32) -> i32 {
        self.nodes[id as usize].i
    }

    fn node(&self, id: u32) -> &PathNode {
        &self.nodes[id as usize]
    }

    fn snake(&mut self, i: i32, j: i32, prev: u32) -> u32 {
        let id = self.nodes.len() as u32;
        // The bootstrap snake sits at j == -1 and must not act as an anchor.
        let last_snake = if i < 0 || j < 0 { NONE } else { id };
        self.nodes.push(PathNode {
            i,
            j,
            prev,
            last_snake,
            snake: true,
        });
        id
    }

    fn diff_node(&mut self, i: i32, j: i32, prev: u32) -> u32 {
        let prev = self.node(prev).last_snake;
        let id = self.nodes.len() as u32;
        // A node that chains straight to the bootstrap anchors the path
        // itself; otherwise the nearest snake ancestor does.
        let last_snake = if i < 0 || j < 0 {
            NONE
        } else if prev == NONE {
            id
        } else {
            prev
        };
        self.nodes.push(PathNode {
            i,
            j,
            prev,
            last_snake,
            snake: false,
        });
        id
    }
}

/// Runs the frontier search over an `n` by `m` edit grid, comparing elements
/// through `eq`, and returns the arena together with the terminal node.
fn build_path(n: usize, m: usize, mut eq: impl FnMut(usize, usize) -> bool) -> (PathArena, u32) {
    let max = n + m + 1;
    let size = 1 + 2 * max;
    let middle = size / 2;

    let mut arena = PathArena::default();
    let mut diagonal = vec![NONE; size];
    diagonal[middle + 1] = arena.snake(0, -1, NONE);

    for d in 0..max as i32 {
        let mut k = -d;
        while k <= d {
            let kmiddle = (middle as i32 + k) as usize;
            let kplus = kmiddle + 1;
            let kminus = kmiddle - 1;

            // Prefer the down move (an insertion) on the lower boundary and
            // whenever the diagonal above reaches further; this tie-break is
            // part of the output contract.
            let (mut i, prev) =
                if k == -d || (k != d && arena.i(diagonal[kminus]) < arena.i(diagonal[kplus])) {
                    (arena.i(diagonal[kplus]), diagonal[kplus])
                } else {
                    (arena.i(diagonal[kminus]) + 1, diagonal[kminus])
                };
            diagonal[kminus] = NONE;

            let mut j = i - k;
            let mut node = arena.diff_node(i, j, prev);

            while (i as usize) < n && (j as usize) < m && eq(i as usize, j as usize) {
                i += 1;
                j += 1;
            }
            if i > arena.i(node) {
                node = arena.snake(i, j, node);
            }
            diagonal[kmiddle] = node;

            if i as usize >= n && j as usize >= m {
                return (arena, node);
            }

            k += 2;
        }
        diagonal[(middle as i32 + d - 1) as usize] = NONE;
    }

    // Myers guarantees the frontier reaches (N, M) within N + M + 1 rounds.
    panic!("myers frontier exhausted without reaching the end of both sequences");
}

/// Walks the path from the terminal node back to the origin, emitting one
/// delta per chain of non-diagonal moves between snakes.
fn build_patch<T: Element>(
    arena: &PathArena,
    terminal: u32,
    original: &[T],
    revised: &[T],
) -> Patch<T> {
    let mut deltas = Vec::new();

    let mut path = terminal;
    if arena.node(path).snake {
        path = arena.node(path).prev;
    }
    while path != NONE {
        let node = arena.node(path);
        if node.prev == NONE || arena.node(node.prev).j < 0 {
            break;
        }
        assert!(!node.snake, "found a snake where a diff node was expected");
        let (i, j) = (node.i as usize, node.j as usize);

        path = node.prev;
        let anchor = arena.node(path);
        let (ianchor, janchor) = (anchor.i as usize, anchor.j as usize);

        deltas.push(Delta::new(
            Chunk::new(ianchor, original[ianchor..i].to_vec()),
            Chunk::new(janchor, revised[janchor..j].to_vec()),
        ));

        if anchor.snake {
            path = anchor.prev;
        }
    }

    // The backtrack emits deltas from the end of the sequences toward the
    // start.
    deltas.reverse();
    Patch::from_sorted_deltas(deltas)
}

fn assert_len(len: usize) {
    assert!(
        len < i32::MAX as usize,
        "unipatch only supports up to {} elements",
        i32::MAX
    );
}

/// Diffs two sequences with the reference engine, comparing elements
/// directly. With `hash_optimization` a 64-bit hash of every element is
/// computed up front and checked before the (potentially expensive) full
/// equality; outputs are identical either way.
pub(crate) fn diff<T: Element>(original: &[T], revised: &[T], hash_optimization: bool) -> Patch<T> {
    assert_len(original.len());
    assert_len(revised.len());
    let (arena, terminal) = if hash_optimization {
        let hasher = RandomState::new();
        let original_hashes: Vec<u64> = original.iter().map(|it| hasher.hash_one(it)).collect();
        let revised_hashes: Vec<u64> = revised.iter().map(|it| hasher.hash_one(it)).collect();
        build_path(original.len(), revised.len(), |i, j| {
            original_hashes[i] == revised_hashes[j] && original[i] == revised[j]
        })
    } else {
        build_path(original.len(), revised.len(), |i, j| {
            original[i] == revised[j]
        })
    };
    build_patch(&arena, terminal, original, revised)
}

/// Diffs two sequences with the accelerated engine: both sides are interned
/// into `u32` tokens first so the entire search runs on integer comparisons.
pub(crate) fn diff_interned<T: Element>(original: &[T], revised: &[T]) -> Patch<T> {
    assert_len(original.len());
    assert_len(revised.len());
    let (original_tokens, revised_tokens) = intern_pair(original, revised);
    let (arena, terminal) = build_path(original.len(), revised.len(), |i, j| {
        original_tokens[i] == revised_tokens[j]
    });
    build_patch(&arena, terminal, original, revised)
}
