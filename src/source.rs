//! Source locations for Basil diagnostics.
//!
//! Every token and AST node carries a [`Location`] naming the file, line,
//! and column it came from. The [`SourceMap`] translates the byte offsets
//! produced during lexing into line/column pairs, treating `\n` as the line
//! break.

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A position in a source file.
///
/// Lines and columns are 1-based. Locations are immutable once attached to
/// a token or AST node; they are cheap to clone (the path is shared).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The file the position refers to (empty for synthesized code).
    pub path: Rc<PathBuf>,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Location {
    /// Creates a location within the given file.
    pub fn new(path: Rc<PathBuf>, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            path: Rc::new(PathBuf::new()),
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.as_os_str().is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
        }
    }
}

/// Maps byte offsets in one file's text to [`Location`]s.
///
/// Built once per file by scanning for newlines; lookups are a binary
/// search over the recorded line starts.
#[derive(Debug, Clone)]
pub struct SourceMap {
    path: Rc<PathBuf>,
    line_starts: Vec<usize>,
}

impl SourceMap {
    /// Builds a map for `text`, attributing positions to `path`.
    pub fn new(path: impl Into<PathBuf>, text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }

        Self {
            path: Rc::new(path.into()),
            line_starts,
        }
    }

    /// The file this map describes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves a byte offset to a line/column location.
    ///
    /// Offsets past the end of the text resolve to the end of the last line.
    pub fn location(&self, offset: usize) -> Location {
        let line_index = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let column = offset - self.line_starts[line_index] + 1;

        Location::new(
            Rc::clone(&self.path),
            (line_index + 1) as u32,
            column as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let map = SourceMap::new("test.bas", "var x as i32\n");
        let location = map.location(4);

        assert_eq!(location.line, 1);
        assert_eq!(location.column, 5);
    }

    #[test]
    fn test_later_lines() {
        let map = SourceMap::new("test.bas", "a\nbb\nccc\n");

        assert_eq!(map.location(0).line, 1);
        assert_eq!(map.location(2).line, 2);
        assert_eq!(map.location(3).column, 2);
        assert_eq!(map.location(5).line, 3);
        assert_eq!(map.location(7).column, 3);
    }

    #[test]
    fn test_offset_past_end() {
        let map = SourceMap::new("test.bas", "ab");
        let location = map.location(10);

        assert_eq!(location.line, 1);
        assert_eq!(location.column, 11);
    }

    #[test]
    fn test_display_includes_path() {
        let map = SourceMap::new("dir/test.bas", "x");
        assert_eq!(map.location(0).to_string(), "dir/test.bas:1:1");
    }

    #[test]
    fn test_display_without_path() {
        let location = Location::default();
        assert_eq!(location.to_string(), "1:1");
    }
}
