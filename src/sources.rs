//! Utilities for turning text into diffable line sequences.
//!
//! The diff and patch machinery works on pre-split lines with their line
//! terminators stripped (`\r\n` and `\n` both count); the emitter writes one
//! logical line per element and leaves separators to the consumer. These
//! helpers implement that convention.

use memchr::memchr;

/// Returns an iterator over the lines of `text` with terminators stripped.
///
/// A trailing newline does not produce an empty final line, matching how
/// text files are conventionally split:
///
/// ```
/// let lines: Vec<&str> = unipatch::lines("a\r\nb\nc").collect();
/// assert_eq!(lines, ["a", "b", "c"]);
/// assert_eq!(unipatch::lines("a\n").count(), 1);
/// ```
pub fn lines(text: &str) -> Lines<'_> {
    Lines(text)
}

/// Splits `text` into owned lines, terminators stripped. See [`lines`].
pub fn split_lines(text: &str) -> Vec<String> {
    lines(text).map(str::to_owned).collect()
}

/// Iterator returned by [`lines`].
#[derive(Clone, Copy)]
pub struct Lines<'a>(&'a str);

impl<'a> Iterator for Lines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_empty() {
            return None;
        }
        let line = match memchr(b'\n', self.0.as_bytes()) {
            Some(end) => {
                let line = &self.0[..end];
                self.0 = &self.0[end + 1..];
                line
            }
            None => {
                let line = self.0;
                self.0 = "";
                line
            }
        };
        Some(line.strip_suffix('\r').unwrap_or(line))
    }
}
