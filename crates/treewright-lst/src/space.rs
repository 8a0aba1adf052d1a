// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The format model: whitespace and comments that precede a tree element.
//!
//! A [`Space`] is everything between two significant tokens. It is split into
//! the whitespace before the first comment and an ordered list of
//! [`Comment`]s, each carrying the whitespace that follows it as its
//! `suffix`. Printing a `Space` concatenates these parts, so
//! `Space::format(raw).to_string() == raw` for any run of trivia.

use std::fmt;

use serde::{Deserialize, Serialize};
use treewright_core::Markers;

/// The lexical style of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentStyle {
    /// `// text` up to (not including) the line terminator.
    Line,
    /// `/* text */`
    Block,
    /// `/** text */`
    Javadoc,
}

/// A single comment, holding its text without delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub style: CommentStyle,
    pub text: String,
    /// Whitespace between the end of this comment and the next comment or token.
    pub suffix: String,
    pub markers: Markers,
}

impl Comment {
    pub fn new(style: CommentStyle, text: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
            suffix: suffix.into(),
            markers: Markers::new(),
        }
    }

    pub fn with_suffix(self, suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
            ..self
        }
    }

    fn write_to(&self, out: &mut String) {
        match self.style {
            CommentStyle::Line => {
                out.push_str("//");
                out.push_str(&self.text);
            }
            CommentStyle::Block => {
                out.push_str("/*");
                out.push_str(&self.text);
                out.push_str("*/");
            }
            CommentStyle::Javadoc => {
                out.push_str("/**");
                out.push_str(&self.text);
                out.push_str("*/");
            }
        }
        out.push_str(&self.suffix);
    }
}

/// Whitespace and comments preceding a tree element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Space {
    whitespace: String,
    comments: Vec<Comment>,
}

impl Space {
    /// No whitespace, no comments.
    pub const EMPTY: Space = Space {
        whitespace: String::new(),
        comments: Vec::new(),
    };

    pub fn new(whitespace: impl Into<String>, comments: Vec<Comment>) -> Self {
        Self {
            whitespace: whitespace.into(),
            comments,
        }
    }

    /// A space consisting only of `whitespace`.
    pub fn build(whitespace: impl Into<String>) -> Self {
        Self::new(whitespace, Vec::new())
    }

    /// A single ASCII space.
    pub fn single_space() -> Self {
        Self::build(" ")
    }

    /// Split raw trivia into whitespace and comments.
    ///
    /// `raw` is expected to contain only whitespace and complete comments,
    /// which is what the tokenizer hands over. Anything else is kept verbatim
    /// in the surrounding whitespace so the text still prints back unchanged.
    pub fn format(raw: &str) -> Space {
        if raw.is_empty() {
            return Space::EMPTY;
        }

        let mut whitespace = String::new();
        let mut comments: Vec<Comment> = Vec::new();
        let mut rest = raw;

        while !rest.is_empty() {
            if let Some(body) = rest.strip_prefix("//") {
                let end = body.find(['\n', '\r']).unwrap_or(body.len());
                comments.push(Comment::new(CommentStyle::Line, &body[..end], ""));
                rest = &body[end..];
            } else if rest.starts_with("/*") {
                let (style, open) = if rest.starts_with("/**") && !rest.starts_with("/**/") {
                    (CommentStyle::Javadoc, 3)
                } else {
                    (CommentStyle::Block, 2)
                };
                let body = &rest[open..];
                match body.find("*/") {
                    Some(end) => {
                        comments.push(Comment::new(style, &body[..end], ""));
                        rest = &body[end + 2..];
                    }
                    None => {
                        // Unterminated; the tokenizer rejects this, keep it lossless anyway.
                        push_trivia(&mut whitespace, &mut comments, rest);
                        rest = "";
                    }
                }
            } else {
                let next = rest
                    .char_indices()
                    .find(|(i, _)| rest[*i..].starts_with("//") || rest[*i..].starts_with("/*"))
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                push_trivia(&mut whitespace, &mut comments, &rest[..next]);
                rest = &rest[next..];
            }
        }

        Space {
            whitespace,
            comments,
        }
    }

    pub fn whitespace(&self) -> &str {
        &self.whitespace
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn is_empty(&self) -> bool {
        self.whitespace.is_empty() && self.comments.is_empty()
    }

    /// Whether this space is only whitespace (possibly empty).
    pub fn is_whitespace_only(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn with_whitespace(self, whitespace: impl Into<String>) -> Self {
        Self {
            whitespace: whitespace.into(),
            ..self
        }
    }

    pub fn with_comments(self, comments: Vec<Comment>) -> Self {
        Self { comments, ..self }
    }

    /// The whitespace closest to the following token: the suffix of the last
    /// comment, or the leading whitespace when there are no comments.
    pub fn last_whitespace(&self) -> &str {
        match self.comments.last() {
            Some(c) => &c.suffix,
            None => &self.whitespace,
        }
    }

    /// The indentation of the element this space precedes: the text after the
    /// last line break, or the whole trailing whitespace when it has none.
    pub fn indent(&self) -> &str {
        let ws = self.last_whitespace();
        match ws.rfind('\n') {
            Some(i) => &ws[i + 1..],
            None => ws,
        }
    }

    pub fn contains_newline(&self) -> bool {
        self.whitespace.contains('\n')
            || self
                .comments
                .iter()
                .any(|c| c.suffix.contains('\n') || c.text.contains('\n'))
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        out.push_str(&self.whitespace);
        for comment in &self.comments {
            comment.write_to(out);
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

fn push_trivia(whitespace: &mut String, comments: &mut [Comment], text: &str) {
    match comments.last_mut() {
        Some(last) => last.suffix.push_str(text),
        None => whitespace.push_str(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_round_trips() {
        for raw in [
            "",
            " ",
            "\n    ",
            "// hello\n",
            "\n\n  /* block */ // line\n  ",
            "/** doc\n * more\n */\n",
            "/**/ ",
            "/***/",
        ] {
            assert_eq!(Space::format(raw).to_string(), raw, "raw: {:?}", raw);
        }
    }

    #[test]
    fn test_format_splits_comments() {
        let space = Space::format("\n  // one\n  /* two */ ");
        assert_eq!(space.whitespace(), "\n  ");
        assert_eq!(space.comments().len(), 2);
        assert_eq!(space.comments()[0].style, CommentStyle::Line);
        assert_eq!(space.comments()[0].text, " one");
        assert_eq!(space.comments()[0].suffix, "\n  ");
        assert_eq!(space.comments()[1].style, CommentStyle::Block);
        assert_eq!(space.comments()[1].suffix, " ");
    }

    #[test]
    fn test_empty_block_comment_is_not_javadoc() {
        let space = Space::format("/**/");
        assert_eq!(space.comments()[0].style, CommentStyle::Block);
        assert_eq!(space.comments()[0].text, "");
    }

    #[test]
    fn test_indent() {
        assert_eq!(Space::format("\n    ").indent(), "    ");
        assert_eq!(Space::format("\n  // c\n        ").indent(), "        ");
        assert_eq!(Space::format(" ").indent(), " ");
        assert_eq!(Space::EMPTY.indent(), "");
    }

    #[test]
    fn test_with_whitespace_keeps_comments() {
        let space = Space::format(" /* c */").with_whitespace("\n");
        assert_eq!(space.to_string(), "\n/* c */");
    }
}
