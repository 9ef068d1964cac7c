//! Directive extraction from raw prompt text.
//!
//! Only a contiguous run of directive lines at the very start of the text is
//! recognised. The first line that does not begin with the marker, including
//! a blank line, starts the payload; marker-like text further down is
//! ordinary content.
//!
//! ```text
//! +++Bullet(style=dash)
//! +++Debate(perspectives=3, topics=["cost", "risk"])
//! What are the main factors?
//! ```

use std::ops::Range;

use decorator_primitives::is_identifier;

use crate::error::ParseError;

/// One comma-separated argument of a directive's parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArgument {
    /// Argument text with surrounding whitespace removed.
    pub text: String,
    /// Byte offset of the first character of `text` in the input.
    pub offset: usize,
}

/// A directive line recognised by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveToken {
    name: String,
    raw_params: Option<String>,
    arguments: Result<Vec<RawArgument>, ParseError>,
    offset: usize,
    line: Range<usize>,
}

impl DirectiveToken {
    /// Decorator name following the marker.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text between the parentheses, if a parameter list was present.
    #[must_use]
    pub fn raw_params(&self) -> Option<&str> {
        self.raw_params.as_deref()
    }

    /// Split arguments, or the syntax error found on this line.
    ///
    /// Syntax errors are kept per line because an unknown decorator's line is
    /// passed through verbatim and never needs to be well formed.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] recorded for a malformed parameter list.
    pub fn arguments(&self) -> Result<&[RawArgument], &ParseError> {
        self.arguments.as_deref()
    }

    /// Byte offset of the marker.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Byte range of the whole line, including its line terminator.
    #[must_use]
    pub fn line(&self) -> Range<usize> {
        self.line.clone()
    }
}

/// Directives and residual payload extracted from a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPrompt<'a> {
    source: &'a str,
    directives: Vec<DirectiveToken>,
    payload_start: usize,
}

impl<'a> ParsedPrompt<'a> {
    /// Directive lines in textual order.
    #[must_use]
    pub fn directives(&self) -> &[DirectiveToken] {
        &self.directives
    }

    /// Text following the directive prefix.
    #[must_use]
    pub fn payload(&self) -> &'a str {
        &self.source[self.payload_start..]
    }

    /// The original input.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Byte offset where the payload begins.
    #[must_use]
    pub const fn payload_start(&self) -> usize {
        self.payload_start
    }
}

/// Splits `text` into leading directive lines and the residual payload.
///
/// # Errors
///
/// Returns [`ParseError`] when a line begins with `marker` but is not followed
/// by an identifier. Malformed parameter lists are recorded on the token
/// instead; see [`DirectiveToken::arguments`].
pub fn parse<'a>(text: &'a str, marker: &str) -> Result<ParsedPrompt<'a>, ParseError> {
    let mut directives = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        let (content_len, line_len) = match rest.find('\n') {
            Some(idx) => (idx, idx + 1),
            None => (rest.len(), rest.len()),
        };
        let content = rest[..content_len].strip_suffix('\r').unwrap_or(&rest[..content_len]);

        let Some(after_marker) = content.strip_prefix(marker) else {
            break;
        };

        let name_start = pos + marker.len();
        let name_len = after_marker
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after_marker.len());
        let name = &after_marker[..name_len];
        if !is_identifier(name) {
            return Err(ParseError::new(
                name_start,
                "expected a decorator name after the directive marker",
            ));
        }

        let tail = &after_marker[name_len..];
        let tail_start = name_start + name_len;
        let (raw_params, arguments) = parse_tail(tail, tail_start);

        directives.push(DirectiveToken {
            name: name.to_owned(),
            raw_params,
            arguments,
            offset: pos,
            line: pos..pos + line_len,
        });
        pos += line_len;
    }

    Ok(ParsedPrompt {
        source: text,
        directives,
        payload_start: pos,
    })
}

/// Parses whatever follows the decorator name on a directive line.
fn parse_tail(
    tail: &str,
    tail_start: usize,
) -> (Option<String>, Result<Vec<RawArgument>, ParseError>) {
    let trimmed = tail.trim_start();
    if trimmed.is_empty() {
        return (None, Ok(Vec::new()));
    }

    let open = tail_start + (tail.len() - trimmed.len());
    let Some(body) = trimmed.strip_prefix('(') else {
        return (
            None,
            Err(ParseError::new(
                open,
                "unexpected text after decorator name; expected `(` or end of line",
            )),
        );
    };

    let body_start = open + 1;
    match scan_arguments(body, body_start) {
        Ok((arguments, close)) => {
            let raw = body[..close].to_owned();
            let after = &body[close + 1..];
            if after.trim().is_empty() {
                (Some(raw), Ok(arguments))
            } else {
                let offset = body_start + close + 1 + (after.len() - after.trim_start().len());
                (
                    Some(raw),
                    Err(ParseError::new(
                        offset,
                        "unexpected text after parameter list",
                    )),
                )
            }
        }
        Err(err) => (Some(body.to_owned()), Err(err)),
    }
}

/// Splits a parameter list on top-level commas.
///
/// `body` starts just after the opening parenthesis. On success returns the
/// arguments and the index of the closing parenthesis within `body`.
fn scan_arguments(body: &str, base: usize) -> Result<(Vec<RawArgument>, usize), ParseError> {
    let mut segments: Vec<Range<usize>> = Vec::new();
    let mut segment_start = 0;
    let mut brackets: Vec<usize> = Vec::new();
    let mut parens: Vec<usize> = Vec::new();
    let mut quote: Option<(char, usize)> = None;
    let mut escaped = false;
    let mut close = None;

    for (idx, ch) in body.char_indices() {
        if let Some((delimiter, _)) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == delimiter {
                quote = None;
            }
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some((ch, idx)),
            '[' => brackets.push(idx),
            ']' => {
                if brackets.pop().is_none() {
                    return Err(ParseError::new(base + idx, "unmatched `]`"));
                }
            }
            '(' => parens.push(idx),
            ')' => {
                if parens.pop().is_none() {
                    if let Some(&open) = brackets.last() {
                        return Err(ParseError::new(base + open, "unclosed `[`"));
                    }
                    segments.push(segment_start..idx);
                    close = Some(idx);
                    break;
                }
            }
            ',' if brackets.is_empty() && parens.is_empty() => {
                segments.push(segment_start..idx);
                segment_start = idx + 1;
            }
            _ => {}
        }
    }

    if let Some((_, start)) = quote {
        return Err(ParseError::new(base + start, "unterminated quoted string"));
    }
    let Some(close) = close else {
        return Err(ParseError::new(
            base.saturating_sub(1),
            "unbalanced parentheses: missing `)`",
        ));
    };

    if segments.len() == 1 && body[segments[0].clone()].trim().is_empty() {
        return Ok((Vec::new(), close));
    }

    let mut arguments = Vec::with_capacity(segments.len());
    for range in segments {
        let raw = &body[range.clone()];
        let text = raw.trim();
        let offset = base + range.start + (raw.len() - raw.trim_start().len());
        if text.is_empty() {
            return Err(ParseError::new(offset, "empty parameter in list"));
        }
        arguments.push(RawArgument {
            text: text.to_owned(),
            offset,
        });
    }

    Ok((arguments, close))
}

/// Splits a standalone parameter list (without the surrounding parentheses).
///
/// # Errors
///
/// Returns [`ParseError`] for unbalanced brackets, unterminated quotes, stray
/// closing parentheses, or empty arguments.
pub fn split_arguments(raw: &str) -> Result<Vec<RawArgument>, ParseError> {
    let wrapped = format!("{raw})");
    let (arguments, close) = scan_arguments(&wrapped, 0)?;
    if close != raw.len() {
        return Err(ParseError::new(close, "unmatched `)`"));
    }
    Ok(arguments)
}
