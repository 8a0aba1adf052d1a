// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenizer for the Java subset.
//!
//! Each token carries the whitespace and comments before it as its prefix, so
//! concatenating `prefix + text` over every token (and the end-of-file
//! token's prefix) reproduces the source exactly.
//!
//! `>` is always a token of its own so that `List<List<String>>` closes two
//! type argument lists. The parser rejoins `>>`, `>=`, `>>=` and friends when
//! the pieces are adjacent.

use std::path::Path;

use treewright_core::text::offset_to_position;

use crate::error::ParseError;
use crate::space::Space;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Identifier,
    Keyword,
    IntLiteral,
    LongLiteral,
    FloatLiteral,
    DoubleLiteral,
    CharLiteral,
    StringLiteral,
    Symbol,
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub prefix: Space,
    /// Byte offset of the first character of `text`.
    pub start: usize,
    /// Byte offset one past the last character of `text`.
    pub end: usize,
}

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null",
];

/// Multi-character symbols, longest first. `>` combinations are deliberately
/// absent.
const SYMBOLS: &[&str] = &[
    "<<=", "...", "->", "::", "++", "--", "&&", "||", "==", "!=", "<=", "<<", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=",
];

pub(crate) fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

pub(crate) fn tokenize<'a>(path: &Path, source: &'a str) -> Result<Vec<Token<'a>>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        let trivia_start = pos;
        pos = skip_trivia(path, source, pos)?;
        let prefix = Space::format(&source[trivia_start..pos]);

        if pos >= bytes.len() {
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: "",
                prefix,
                start: pos,
                end: pos,
            });
            return Ok(tokens);
        }

        let start = pos;
        let c = bytes[pos];
        let kind = if c.is_ascii_alphabetic() || c == b'_' || c == b'$' || c >= 0x80 {
            pos = scan_identifier(source, pos);
            if is_keyword(&source[start..pos]) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            }
        } else if c.is_ascii_digit()
            || (c == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit))
        {
            let (end, kind) = scan_number(bytes, pos);
            pos = end;
            kind
        } else if c == b'"' {
            pos = scan_string(path, source, pos)?;
            TokenKind::StringLiteral
        } else if c == b'\'' {
            pos = scan_quoted(path, source, pos, b'\'')?;
            TokenKind::CharLiteral
        } else {
            pos += SYMBOLS
                .iter()
                .find(|s| source[pos..].starts_with(*s))
                .map(|s| s.len())
                .unwrap_or_else(|| char_len(source, pos));
            TokenKind::Symbol
        };

        tokens.push(Token {
            kind,
            text: &source[start..pos],
            prefix,
            start,
            end: pos,
        });
    }
}

fn char_len(source: &str, pos: usize) -> usize {
    source[pos..].chars().next().map(char::len_utf8).unwrap_or(1)
}

fn skip_trivia(path: &Path, source: &str, mut pos: usize) -> Result<usize, ParseError> {
    let bytes = source.as_bytes();
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => pos += 1,
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                pos = source[pos..]
                    .find(['\n', '\r'])
                    .map(|i| pos + i)
                    .unwrap_or(bytes.len());
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => match source[pos + 2..].find("*/") {
                Some(i) => pos = pos + 2 + i + 2,
                None => {
                    return Err(ParseError::UnterminatedComment {
                        path: path.to_path_buf(),
                        position: offset_to_position(source, pos),
                    })
                }
            },
            _ => break,
        }
    }
    Ok(pos)
}

fn scan_identifier(source: &str, pos: usize) -> usize {
    source[pos..]
        .char_indices()
        .find(|(_, ch)| !(ch.is_alphanumeric() || *ch == '_' || *ch == '$'))
        .map(|(i, _)| pos + i)
        .unwrap_or(source.len())
}

fn scan_number(bytes: &[u8], start: usize) -> (usize, TokenKind) {
    let mut pos = start;
    let hex = bytes.get(pos) == Some(&b'0') && matches!(bytes.get(pos + 1), Some(b'x' | b'X'));
    if hex {
        pos += 2;
    }
    let mut is_decimal = false;
    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_digit() || c == b'_' || (hex && c.is_ascii_hexdigit()) {
            pos += 1;
        } else if c == b'.' && !hex && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
            is_decimal = true;
            pos += 1;
        } else if c == b'.' && !hex && !is_decimal && pos > start {
            // `1.` is a complete double literal
            is_decimal = true;
            pos += 1;
        } else if matches!(c, b'e' | b'E') && !hex {
            is_decimal = true;
            pos += 1;
            if matches!(bytes.get(pos), Some(b'+' | b'-')) {
                pos += 1;
            }
        } else {
            break;
        }
    }
    let kind = match bytes.get(pos) {
        Some(b'l' | b'L') => {
            pos += 1;
            TokenKind::LongLiteral
        }
        Some(b'f' | b'F') if !hex => {
            pos += 1;
            TokenKind::FloatLiteral
        }
        Some(b'd' | b'D') if !hex => {
            pos += 1;
            TokenKind::DoubleLiteral
        }
        _ if is_decimal => TokenKind::DoubleLiteral,
        _ => TokenKind::IntLiteral,
    };
    (pos, kind)
}

fn scan_string(path: &Path, source: &str, start: usize) -> Result<usize, ParseError> {
    if source[start..].starts_with("\"\"\"") {
        return match source[start + 3..].find("\"\"\"") {
            Some(i) => Ok(start + 3 + i + 3),
            None => Err(ParseError::UnterminatedLiteral {
                path: path.to_path_buf(),
                position: offset_to_position(source, start),
            }),
        };
    }
    scan_quoted(path, source, start, b'"')
}

fn scan_quoted(path: &Path, source: &str, start: usize, quote: u8) -> Result<usize, ParseError> {
    let bytes = source.as_bytes();
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'\n' | b'\r' => break,
            c if c == quote => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(ParseError::UnterminatedLiteral {
        path: path.to_path_buf(),
        position: offset_to_position(source, start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        tokenize(Path::new("T.java"), source)
            .unwrap()
            .iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_tokens_reproduce_source() {
        let source = "class A { // c\n  int x = 0x1F + 2L; /* b */ }\n";
        let tokens = tokenize(Path::new("A.java"), source).unwrap();
        let mut out = String::new();
        for token in &tokens {
            out.push_str(&token.prefix.to_string());
            out.push_str(token.text);
        }
        assert_eq!(out, source);
    }

    #[test]
    fn test_greater_than_is_split() {
        assert_eq!(texts("a >>= b"), vec!["a", ">", ">", "=", "b", ""]);
        assert_eq!(texts("x <<= 1"), vec!["x", "<<=", "1", ""]);
    }

    #[test]
    fn test_number_kinds() {
        let tokens = tokenize(Path::new("T.java"), "1 2L 3.0 4f 1e10 0xFF").unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::IntLiteral,
                TokenKind::LongLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::FloatLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_comment_is_fatal() {
        let err = tokenize(Path::new("T.java"), "class A { /* open").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedComment { .. }));
    }

    #[test]
    fn test_unterminated_string_is_fatal() {
        let err = tokenize(Path::new("T.java"), "String s = \"abc\n;").unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedLiteral { .. }));
    }
}
