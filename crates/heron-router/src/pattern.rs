//! Route pattern compilation.
//!
//! A route pattern is a path template whose literal text is regex source
//! and whose parameters are written as colon tokens:
//!
//! | Token | Captures |
//! |-------|----------|
//! | `:id` | any run of non-slash characters |
//! | `:id[\d]` | one or more characters from the class |
//! | `:tab{show\|hide}` | exactly one of the literal alternatives |
//!
//! A colon preceded by a backslash (`\:`) is a literal colon. Because the
//! literal text is passed through unchanged, regex constructs such as
//! optional groups (`/list(/:page)?`) can be used to build optional
//! segments.
//!
//! Patterns are validated eagerly: unbalanced brackets, empty
//! alternations, duplicate parameter names and anything the regex engine
//! rejects are reported when the route is registered.

use std::iter::Peekable;
use std::str::Chars;

use regex::RegexBuilder;

use crate::{MatchOptions, RouteError};

/// Expression used for bare `:name` parameters.
const SEGMENT_EXPR: &str = "[^/]+";

/// Bare segment expression with Unicode re-enabled locally. A negated class
/// outside Unicode mode could match invalid UTF-8, which `Regex` rejects.
const SEGMENT_EXPR_UNICODE: &str = "(?u:[^/]+)";

/// What a single parameter token captures.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Capture {
    /// Bare `:name`, any run of non-slash characters.
    Segment,
    /// `:name[class]`, one or more characters of the class.
    Class(String),
    /// `:name{a|b}`, exactly one of the literal values.
    OneOf(Vec<String>),
}

impl Capture {
    fn expression(&self, unicode: bool) -> String {
        match self {
            Self::Segment if unicode => SEGMENT_EXPR.to_string(),
            Self::Segment => SEGMENT_EXPR_UNICODE.to_string(),
            Self::Class(class) => format!("[{class}]+"),
            Self::OneOf(values) => values
                .iter()
                .map(|value| regex::escape(value))
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Param { name: String, capture: Capture },
}

/// A route pattern translated into a regex fragment.
///
/// # Example
///
/// ```rust
/// use heron_router::{CompiledPattern, MatchOptions};
///
/// let compiled = CompiledPattern::compile("/book/:id[\\d]", &MatchOptions::default()).unwrap();
/// assert_eq!(compiled.params(), ["id"]);
/// assert_eq!(compiled.fragment(), "/book/(?P<id>[\\d]+)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    pattern: String,
    pieces: Vec<Piece>,
    params: Vec<String>,
    trailing_slash: bool,
    unicode: bool,
}

impl CompiledPattern {
    /// Compiles a pattern, validating it eagerly.
    ///
    /// The pattern is normalized first (see [`normalize_pattern`]).
    pub fn compile(pattern: &str, options: &MatchOptions) -> Result<Self, RouteError> {
        let pattern = normalize_pattern(pattern)?;
        let pieces = parse(&pattern)?;

        let mut params: Vec<String> = Vec::new();
        for piece in &pieces {
            if let Piece::Param { name, .. } = piece {
                if params.contains(name) {
                    return Err(RouteError::DuplicateParameter {
                        pattern,
                        name: name.clone(),
                    });
                }
                params.push(name.clone());
            }
        }

        let compiled = Self {
            trailing_slash: options.trailing_slash_optional && pattern != "/",
            unicode: options.unicode,
            pattern,
            pieces,
            params,
        };
        compiled.validate(options)?;
        Ok(compiled)
    }

    /// Returns the normalized source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns parameter names in first-occurrence order.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Returns the fragment with groups named after the parameters.
    #[must_use]
    pub fn fragment(&self) -> String {
        self.render(|index| self.params[index].clone())
    }

    /// Renders the fragment, naming the n-th parameter group with `group_name(n)`.
    pub(crate) fn render(&self, mut group_name: impl FnMut(usize) -> String) -> String {
        let mut out = String::with_capacity(self.pattern.len() + 16);
        let mut index = 0;
        for piece in &self.pieces {
            match piece {
                Piece::Literal(source) => out.push_str(source),
                Piece::Param { capture, .. } => {
                    out.push_str("(?P<");
                    out.push_str(&group_name(index));
                    out.push('>');
                    out.push_str(&capture.expression(self.unicode));
                    out.push(')');
                    index += 1;
                }
            }
        }
        if self.trailing_slash {
            out.push_str("/?");
        }
        out
    }

    fn validate(&self, options: &MatchOptions) -> Result<(), RouteError> {
        RegexBuilder::new(&format!("^(?:{})$", self.fragment()))
            .unicode(options.unicode)
            .build()
            .map(|_| ())
            .map_err(|e| RouteError::malformed(&self.pattern, e.to_string()))
    }
}

/// Normalizes a pattern into its route identity key.
///
/// Surrounding whitespace is trimmed and a single trailing slash is
/// stripped unless the pattern is the root `/`.
///
/// ```rust
/// use heron_router::normalize_pattern;
///
/// assert_eq!(normalize_pattern(" /books/ ").unwrap(), "/books");
/// assert_eq!(normalize_pattern("/").unwrap(), "/");
/// assert!(normalize_pattern("  ").is_err());
/// ```
pub fn normalize_pattern(pattern: &str) -> Result<String, RouteError> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(RouteError::EmptyPattern);
    }
    if trimmed == "/" {
        return Ok(trimmed.to_string());
    }
    Ok(trimmed.strip_suffix('/').unwrap_or(trimmed).to_string())
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse(pattern: &str) -> Result<Vec<Piece>, RouteError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(':') => literal.push(':'),
                Some(next) => {
                    literal.push('\\');
                    literal.push(next);
                }
                None => return Err(RouteError::malformed(pattern, "trailing escape character")),
            },
            ':' if chars.peek().is_some_and(|next| is_name_start(*next)) => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if !is_name_char(next) {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }

                let capture = match chars.peek() {
                    Some('[') => {
                        chars.next();
                        Capture::Class(read_class(pattern, &mut chars)?)
                    }
                    Some('{') => {
                        chars.next();
                        Capture::OneOf(read_alternatives(pattern, &mut chars)?)
                    }
                    _ => Capture::Segment,
                };

                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(Piece::Param { name, capture });
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

fn read_class(pattern: &str, chars: &mut Peekable<Chars<'_>>) -> Result<String, RouteError> {
    let mut class = String::new();
    loop {
        match chars.next() {
            Some('\\') => {
                class.push('\\');
                match chars.next() {
                    Some(escaped) => class.push(escaped),
                    None => {
                        return Err(RouteError::malformed(pattern, "unterminated character class"))
                    }
                }
            }
            Some(']') => break,
            Some(c) => class.push(c),
            None => return Err(RouteError::malformed(pattern, "unterminated character class")),
        }
    }

    if class.is_empty() {
        return Err(RouteError::malformed(pattern, "empty character class"));
    }
    Ok(class)
}

fn read_alternatives(
    pattern: &str,
    chars: &mut Peekable<Chars<'_>>,
) -> Result<Vec<String>, RouteError> {
    let mut body = String::new();
    loop {
        match chars.next() {
            Some('}') => break,
            Some(c) => body.push(c),
            None => return Err(RouteError::malformed(pattern, "unterminated alternation")),
        }
    }

    let values: Vec<String> = body.split('|').map(str::to_string).collect();
    if values.iter().any(String::is_empty) {
        return Err(RouteError::malformed(pattern, "empty alternative"));
    }
    Ok(values)
}
