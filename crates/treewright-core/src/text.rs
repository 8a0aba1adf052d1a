//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, not bytes

/// A 1-indexed line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Convert a byte offset to a 1-indexed line and column.
///
/// If `offset` exceeds the content length, returns the position at the end
/// of the content. An offset inside a multi-byte character is treated as the
/// start of that character.
pub fn offset_to_position(content: &str, offset: usize) -> Position {
    let offset = offset.min(content.len());
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    Position { line, col }
}

/// Convert a 1-indexed line and column to a byte offset.
///
/// Line or column values of 0 are treated as 1. A position past the end of
/// its line clamps to the line end; a line past the end of the content
/// returns the content length.
pub fn position_to_offset(content: &str, line: u32, col: u32) -> usize {
    let line = line.max(1);
    let col = col.max(1);

    let mut current_line = 1u32;
    let mut line_start = 0usize;
    if line > 1 {
        let mut found = false;
        for (i, ch) in content.char_indices() {
            if ch == '\n' {
                current_line += 1;
                if current_line == line {
                    line_start = i + 1;
                    found = true;
                    break;
                }
            }
        }
        if !found {
            return content.len();
        }
    }

    let mut current_col = 1u32;
    for (i, ch) in content[line_start..].char_indices() {
        if current_col == col || ch == '\n' {
            return line_start + i;
        }
        current_col += 1;
    }
    content.len()
}

/// The full text of the 1-indexed `line`, without its terminator.
pub fn line_text(content: &str, line: u32) -> Option<&str> {
    content
        .split('\n')
        .nth(line.max(1) as usize - 1)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_position() {
        let text = "class A {\n  int x;\n}";
        assert_eq!(offset_to_position(text, 0), Position { line: 1, col: 1 });
        assert_eq!(offset_to_position(text, 10), Position { line: 2, col: 1 });
        assert_eq!(offset_to_position(text, 14), Position { line: 2, col: 5 });
        assert_eq!(offset_to_position(text, 1000), Position { line: 3, col: 2 });
    }

    #[test]
    fn test_position_to_offset() {
        let text = "class A {\n  int x;\n}";
        assert_eq!(position_to_offset(text, 1, 1), 0);
        assert_eq!(position_to_offset(text, 2, 3), 12);
        assert_eq!(position_to_offset(text, 2, 100), 18);
        assert_eq!(position_to_offset(text, 9, 1), text.len());
        assert_eq!(position_to_offset(text, 0, 0), 0);
    }

    #[test]
    fn test_multibyte_columns() {
        let text = "s = \"héllo\";";
        let offset = text.find('l').unwrap();
        assert_eq!(offset_to_position(text, offset).col, 8);
        assert_eq!(position_to_offset(text, 1, 8), offset);
    }

    #[test]
    fn test_line_text() {
        let text = "a\r\nb\nc";
        assert_eq!(line_text(text, 1), Some("a"));
        assert_eq!(line_text(text, 3), Some("c"));
        assert_eq!(line_text(text, 4), None);
    }
}
