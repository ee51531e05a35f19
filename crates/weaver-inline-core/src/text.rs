//! Text buffer abstraction for flat (textarea-like) regions.
//!
//! The `TextBuffer` trait is the storage behind a Buffer substrate. All
//! offsets are in Unicode scalar values (chars), not bytes or UTF-16.

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

/// A text buffer that supports splicing and offset conversion.
pub trait TextBuffer {
    /// Total length in chars (Unicode scalar values).
    fn len_chars(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Insert text at char offset.
    fn insert(&mut self, char_offset: usize, text: &str);

    /// Delete char range.
    fn delete(&mut self, char_range: Range<usize>);

    /// Replace char range with text.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.delete(char_range.clone());
        self.insert(char_range.start, text);
    }

    /// Get a slice as SmolStr. Returns None if range is invalid.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    /// Convert entire buffer to String.
    fn to_string(&self) -> String;

    /// Zero-based line index containing a char offset.
    fn char_to_line(&self, char_offset: usize) -> usize;

    /// Char offset where a line starts.
    fn line_to_char(&self, line: usize) -> usize;
}

/// Ropey-backed text buffer.
///
/// Provides O(log n) editing operations and offset conversions.
#[derive(Clone, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    /// Create a new empty rope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from string.
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    /// Get a reference to the underlying rope.
    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }
}

impl TextBuffer for EditorRope {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.rope.insert(char_offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        self.rope.remove(char_range);
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn char_to_line(&self, char_offset: usize) -> usize {
        self.rope.char_to_line(char_offset.min(self.rope.len_chars()))
    }

    fn line_to_char(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.rope.len_lines()))
    }
}

impl std::fmt::Debug for EditorRope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EditorRope").field(&self.rope.to_string()).finish()
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditorRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut rope = EditorRope::from_str("hello world");
        assert_eq!(rope.len_chars(), 11);
        assert_eq!(rope.to_string(), "hello world");

        rope.insert(5, " beautiful");
        assert_eq!(rope.to_string(), "hello beautiful world");

        rope.delete(5..15);
        assert_eq!(rope.to_string(), "hello world");
    }

    #[test]
    fn test_slice() {
        let rope = EditorRope::from_str("hello world");
        assert_eq!(rope.slice(0..5).as_deref(), Some("hello"));
        assert_eq!(rope.slice(6..11).as_deref(), Some("world"));
        assert_eq!(rope.slice(0..100), None);
    }

    #[test]
    fn test_replace_multibyte() {
        let mut rope = EditorRope::from_str("héllo wörld");
        rope.replace(6..11, "rust");
        assert_eq!(rope.to_string(), "héllo rust");
        assert_eq!(rope.len_chars(), 10);
    }

    #[test]
    fn test_lines() {
        let rope = EditorRope::from_str("one\ntwo\nthree");
        assert_eq!(rope.char_to_line(0), 0);
        assert_eq!(rope.char_to_line(5), 1);
        assert_eq!(rope.line_to_char(2), 8);
    }
}
