// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The pointcut pattern language.
//!
//! Pattern strings are parsed once into small match trees; matching never
//! looks at the pattern text again.
//!
//! ## Grammar
//!
//! ```text
//! <type>        := <segment> (("." | "..") <segment>)* ("[]")*
//! <segment>     := [A-Za-z0-9_$*]+
//! <method>      := <type> (ws+ | ws* "#" ws*) <name> ws* "(" <params>? ")"
//! <name>        := "<constructor>" | <segment>
//! <params>      := <param> ("," <param>)*
//! <param>       := ".." | <type> "..."?
//! <annotation>  := "@" <type> ("(" <arguments>? ")")?
//! <arguments>   := <argument> ("," <argument>)*
//! <argument>    := (<identifier> "=")? <value>
//! ```
//!
//! ## Examples
//!
//! ```text
//! java.util.List                      # exactly java.util.List
//! java.util.*                         # any class directly in java.util
//! java.util..*                        # any class in java.util or a subpackage
//! java.util.*List                     # a glob inside one segment
//! java.util.Map$Entry                 # a nested class
//! int[]                               # an array of int
//! java.util.List add(..)              # add with any parameters
//! java.util.List#add(int, *)          # add(int, <any one type>)
//! *..* <constructor>(..)              # every constructor
//! @java.lang.SuppressWarnings("unchecked")
//! @java.lang.Deprecated(since = "9", forRemoval = true)
//! ```

use winnow::ascii::{multispace0, multispace1};
use winnow::combinator::{alt, delimited, opt, repeat, separated, terminated};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::take_while;
use winnow::ModalResult;

use crate::error::PatternError;

/// One step of a type pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly one name segment; `*` inside never crosses a `.`.
    Glob(String),
    /// `..`: zero or more name segments.
    AnyDepth,
}

/// A parsed type pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePattern {
    pub segments: Vec<Segment>,
    /// Number of trailing `[]` (or a trailing `...` in a parameter list).
    pub dimensions: usize,
}

impl TypePattern {
    /// `*`, `*..*` and similar: every type, arrays and primitives included.
    pub fn is_any(&self) -> bool {
        self.dimensions == 0
            && self.segments.iter().all(|s| match s {
                Segment::Glob(g) => g == "*",
                Segment::AnyDepth => true,
            })
    }

    /// The fully-qualified name this pattern matches, if it contains no
    /// wildcard.
    pub fn literal_name(&self) -> Option<String> {
        let mut parts = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Glob(g) if !g.contains('*') => parts.push(g.as_str()),
                _ => return None,
            }
        }
        Some(format!("{}{}", parts.join("."), "[]".repeat(self.dimensions)))
    }

    /// Whether the (erased) type name `name` matches, for example
    /// `java.util.List`, `int` or `java.lang.String[]`.
    pub fn matches_name(&self, name: &str) -> bool {
        if self.is_any() {
            return true;
        }
        let mut base = name;
        let mut dimensions = 0;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped;
            dimensions += 1;
        }
        if dimensions != self.dimensions {
            return false;
        }
        let parts: Vec<&str> = base.split('.').collect();
        match_segments(&self.segments, &parts)
    }
}

fn match_segments(pattern: &[Segment], parts: &[&str]) -> bool {
    match pattern.split_first() {
        None => parts.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=parts.len()).any(|skip| match_segments(rest, &parts[skip..]))
        }
        Some((Segment::Glob(glob), rest)) => match parts.split_first() {
            Some((part, parts)) => glob_match(glob, part) && match_segments(rest, parts),
            None => false,
        },
    }
}

/// `*` matches any run of characters; everything else matches itself.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}

/// One entry of a method pattern's parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamPattern {
    /// `..`: any number of parameters of any types.
    AnyParams,
    Type(TypePattern),
}

/// A parsed method pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPattern {
    pub declaring_type: TypePattern,
    /// A glob, or `<constructor>`.
    pub name: String,
    pub parameters: Vec<ParamPattern>,
}

impl MethodPattern {
    /// Whether the parameter type names (already erased) match, with `..`
    /// allowed anywhere in the pattern.
    pub fn matches_parameters<S: AsRef<str>>(&self, names: &[S]) -> bool {
        match_parameters(&self.parameters, names)
    }
}

fn match_parameters<S: AsRef<str>>(pattern: &[ParamPattern], names: &[S]) -> bool {
    match pattern.split_first() {
        None => names.is_empty(),
        Some((ParamPattern::AnyParams, rest)) => {
            (0..=names.len()).any(|skip| match_parameters(rest, &names[skip..]))
        }
        Some((ParamPattern::Type(ty), rest)) => match names.split_first() {
            Some((name, names)) => ty.matches_name(name.as_ref()) && match_parameters(rest, names),
            None => false,
        },
    }
}

/// A parsed annotation pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationPattern {
    pub annotation_type: TypePattern,
    /// `None` when the pattern has no parentheses. A bare argument is
    /// recorded under the name `value`.
    pub arguments: Option<Vec<(String, String)>>,
}

// ============================================================================
// Entry points
// ============================================================================

pub fn parse_type_pattern(pattern: &str) -> Result<TypePattern, PatternError> {
    let input = non_empty(pattern, "type")?;
    delimited(multispace0, type_pattern, multispace0)
        .parse(input)
        .map_err(|e| PatternError::invalid(pattern, &input[e.offset()..], "expected a type pattern"))
}

pub fn parse_method_pattern(pattern: &str) -> Result<MethodPattern, PatternError> {
    let input = non_empty(pattern, "method")?;
    method_pattern.parse(input).map_err(|e| {
        PatternError::invalid(
            pattern,
            &input[e.offset()..],
            "expected `<type> <name>(<parameters>)`",
        )
    })
}

pub fn parse_annotation_pattern(pattern: &str) -> Result<AnnotationPattern, PatternError> {
    let input = non_empty(pattern, "annotation")?;
    annotation_pattern.parse(input).map_err(|e| {
        PatternError::invalid(
            pattern,
            &input[e.offset()..],
            "expected `@<type>` with optional arguments",
        )
    })
}

fn non_empty<'a>(pattern: &'a str, what: &str) -> Result<&'a str, PatternError> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(PatternError::invalid(
            pattern,
            "",
            format!("empty {} pattern", what),
        ));
    }
    Ok(trimmed)
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

fn is_segment_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '*'
}

fn segment<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., is_segment_char).parse_next(input)
}

fn type_pattern(input: &mut &str) -> ModalResult<TypePattern> {
    let first = segment(input)?;
    let mut segments = vec![Segment::Glob(first.to_string())];
    loop {
        // `String...` in a parameter list.
        if input.starts_with("...") {
            break;
        }
        if let Some(rest) = input.strip_prefix("..") {
            if !rest.starts_with(is_segment_char) {
                break;
            }
            *input = rest;
            segments.push(Segment::AnyDepth);
        } else if let Some(rest) = input.strip_prefix('.') {
            if !rest.starts_with(is_segment_char) {
                break;
            }
            *input = rest;
        } else {
            break;
        }
        segments.push(Segment::Glob(segment(input)?.to_string()));
    }
    let dimensions: usize = repeat(0.., "[]").parse_next(input)?;
    Ok(TypePattern {
        segments,
        dimensions,
    })
}

fn method_name(input: &mut &str) -> ModalResult<String> {
    alt(("<constructor>", segment))
        .map(str::to_string)
        .parse_next(input)
}

fn param_pattern(input: &mut &str) -> ModalResult<ParamPattern> {
    alt((
        "..".value(ParamPattern::AnyParams),
        (type_pattern, opt("...")).map(|(mut ty, varargs)| {
            if varargs.is_some() {
                ty.dimensions += 1;
            }
            ParamPattern::Type(ty)
        }),
    ))
    .parse_next(input)
}

fn method_pattern(input: &mut &str) -> ModalResult<MethodPattern> {
    let declaring_type = type_pattern(input)?;
    alt(((multispace0, '#', multispace0).void(), multispace1.void())).parse_next(input)?;
    let name = method_name(input)?;
    let _ = multispace0.parse_next(input)?;
    let parameters: Vec<ParamPattern> = delimited(
        ('(', multispace0),
        separated(0.., param_pattern, (multispace0, ',', multispace0)),
        (multispace0, ')'),
    )
    .parse_next(input)?;
    Ok(MethodPattern {
        declaring_type,
        name,
        parameters,
    })
}

fn identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '$').parse_next(input)
}

/// An argument value in source form: everything up to a `,` or `)` that is
/// not nested in brackets or quotes.
fn argument_value<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    let current: &'a str = input;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut end = current.len();
    for (i, c) in current.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' if depth > 0 => depth -= 1,
            ',' | ')' if depth == 0 => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    let value = current[..end].trim_end();
    if value.is_empty() {
        return Err(ErrMode::from_input(input));
    }
    let (value, rest) = current.split_at(value.len());
    *input = rest;
    Ok(value)
}

fn annotation_argument(input: &mut &str) -> ModalResult<(String, String)> {
    let name = opt(terminated(identifier, (multispace0, '=', multispace0))).parse_next(input)?;
    let value = argument_value(input)?;
    Ok((name.unwrap_or("value").to_string(), value.to_string()))
}

fn annotation_pattern(input: &mut &str) -> ModalResult<AnnotationPattern> {
    let _ = '@'.parse_next(input)?;
    let annotation_type = type_pattern(input)?;
    let _ = multispace0.parse_next(input)?;
    let arguments: Option<Vec<(String, String)>> = opt(delimited(
        ('(', multispace0),
        separated(0.., annotation_argument, (multispace0, ',', multispace0)),
        (multispace0, ')'),
    ))
    .parse_next(input)?;
    Ok(AnnotationPattern {
        annotation_type,
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob(s: &str) -> Segment {
        Segment::Glob(s.to_string())
    }

    #[test]
    fn test_parse_type_segments() {
        let p = parse_type_pattern("java.util..*").unwrap();
        assert_eq!(
            p.segments,
            vec![glob("java"), glob("util"), Segment::AnyDepth, glob("*")]
        );
        assert_eq!(p.dimensions, 0);

        let p = parse_type_pattern("java.lang.String[][]").unwrap();
        assert_eq!(p.dimensions, 2);
        assert_eq!(p.literal_name().as_deref(), Some("java.lang.String[][]"));
    }

    #[test]
    fn test_star_never_crosses_dot() {
        let p = parse_type_pattern("java.*").unwrap();
        assert!(p.matches_name("java.Foo"));
        assert!(!p.matches_name("java.util.List"));
    }

    #[test]
    fn test_glob_inside_segment() {
        assert!(glob_match("*List", "ArrayList"));
        assert!(glob_match("A*r*y", "Array"));
        assert!(!glob_match("*List", "ListFoo"));
        assert!(glob_match("*", ""));
    }

    #[test]
    fn test_any_matches_everything() {
        let p = parse_type_pattern("*").unwrap();
        assert!(p.is_any());
        assert!(p.matches_name("int"));
        assert!(p.matches_name("java.lang.String[]"));
        assert!(parse_type_pattern("*..*").unwrap().matches_name("A"));
    }

    #[test]
    fn test_parse_method_pattern() {
        let p = parse_method_pattern("java.util.List add(int, ..)").unwrap();
        assert_eq!(p.name, "add");
        assert_eq!(p.parameters.len(), 2);
        assert_eq!(p.parameters[1], ParamPattern::AnyParams);

        let p = parse_method_pattern("java.util.List#add()").unwrap();
        assert!(p.parameters.is_empty());

        let p = parse_method_pattern("*..* <constructor>(..)").unwrap();
        assert_eq!(p.name, "<constructor>");
    }

    #[test]
    fn test_varargs_parameter_is_array() {
        let p = parse_method_pattern("a.B m(java.lang.String...)").unwrap();
        assert!(p.matches_parameters(&["java.lang.String[]"]));
        assert!(!p.matches_parameters(&["java.lang.String"]));
    }

    #[test]
    fn test_any_params_anywhere() {
        let p = parse_method_pattern("a.B m(.., int)").unwrap();
        assert!(p.matches_parameters(&["int"]));
        assert!(p.matches_parameters(&["java.lang.String", "long", "int"]));
        assert!(!p.matches_parameters(&["int", "long"]));
    }

    #[test]
    fn test_parse_annotation_pattern() {
        let p = parse_annotation_pattern("@java.lang.SuppressWarnings(\"a, b\")").unwrap();
        assert_eq!(
            p.arguments,
            Some(vec![("value".to_string(), "\"a, b\"".to_string())])
        );

        let p = parse_annotation_pattern("@a.B(x = 1, y=f(2, 3))").unwrap();
        assert_eq!(
            p.arguments,
            Some(vec![
                ("x".to_string(), "1".to_string()),
                ("y".to_string(), "f(2, 3)".to_string()),
            ])
        );

        assert_eq!(parse_annotation_pattern("@a.B").unwrap().arguments, None);
    }

    #[test]
    fn test_errors_name_the_fragment() {
        let err = parse_method_pattern("java.util.List add(int").unwrap_err();
        assert_eq!(err.pattern(), "java.util.List add(int");

        let err = parse_type_pattern("java.util.List<String>").unwrap_err();
        assert_eq!(err.fragment(), "<String>");

        let err = parse_type_pattern("   ").unwrap_err();
        assert_eq!(err.fragment(), "<end>");

        assert!(parse_annotation_pattern("java.lang.Deprecated").is_err());
        assert!(parse_method_pattern("java.util.List").is_err());
    }
}
