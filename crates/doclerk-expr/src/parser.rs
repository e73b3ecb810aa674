/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Mini-language compiler.
//!
//! Two entry points turn raw text into an [`Expression`]:
//!
//! - [`parse_expression`] for a standalone value, which must be exactly one
//!   of: blank text, a `"string literal"`, a `&variable` or a
//!   `$function(arg, ...)` call.
//! - [`parse_template`] for free text with embedded `&variable` and
//!   `$function(...)` references.
//!
//! Inside an argument list, parentheses nest, `"` toggles a string literal
//! (parentheses and commas inside it are plain text) and `\` escapes the
//! next character. Arguments are themselves standalone values.

use crate::ast::Expression;
use crate::error::{ExprError, ExprResult};
use crate::value::ExpectedType;

/// Introduces a variable reference.
pub const VAR_SIGIL: char = '&';

/// Introduces a function call.
pub const FUNCTION_SIGIL: char = '$';

const QUOTE: char = '"';
const ESCAPE: char = '\\';
const OPEN: char = '(';
const CLOSE: char = ')';
const SEPARATOR: char = ',';

/// Parse a standalone value.
///
/// `None` compiles to the null literal. `expected` is the type the caller
/// needs: blank text and string literals can only produce text, so asking
/// them for a non-text type is a type mismatch. References may produce
/// anything and are never rejected here.
pub fn parse_expression(input: Option<&str>, expected: ExpectedType) -> ExprResult<Expression> {
    let Some(source) = input else {
        return Ok(Expression::null());
    };
    let trimmed = source.trim();

    if trimmed.is_empty() {
        require_text(source, expected)?;
        return Ok(Expression::text(source));
    }

    if trimmed.starts_with(QUOTE) {
        require_text(trimmed, expected)?;
        parse_string(trimmed)
    } else if let Some(name) = trimmed.strip_prefix(VAR_SIGIL) {
        if name.is_empty() {
            return Err(ExprError::syntax(format!(
                "expected a variable name after '{VAR_SIGIL}'"
            )));
        }
        Ok(Expression::var(name))
    } else if let Some(call) = trimmed.strip_prefix(FUNCTION_SIGIL) {
        parse_call(call)
    } else {
        Err(ExprError::syntax(format!(
            "failed to parse expression: {source}"
        )))
    }
}

/// Parse free text with embedded references.
///
/// Literal runs become literal segments. `&` followed by letters or digits
/// is a variable reference that ends at the first other character. `$`
/// followed by a function name and `(` is a call that ends where its
/// parentheses balance. A sigil that does not start a reference is kept as
/// text. One segment is returned as is; several are wrapped in
/// [`Expression::Concat`].
pub fn parse_template(input: Option<&str>) -> ExprResult<Expression> {
    let Some(source) = input else {
        return Ok(Expression::null());
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(c) = rest.chars().next() {
        let reference_len = match c {
            VAR_SIGIL => scan_variable(rest),
            FUNCTION_SIGIL => scan_call(rest)?,
            _ => None,
        };

        match reference_len {
            Some(len) => {
                flush_literal(&mut segments, &mut literal);
                segments.push(parse_expression(Some(&rest[..len]), ExpectedType::Text)?);
                rest = &rest[len..];
            }
            None => {
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    flush_literal(&mut segments, &mut literal);

    Ok(match segments.len() {
        0 => Expression::text(""),
        1 => segments.remove(0),
        _ => Expression::Concat(segments),
    })
}

fn flush_literal(segments: &mut Vec<Expression>, literal: &mut String) {
    if !literal.is_empty() {
        segments.push(Expression::text(std::mem::take(literal)));
    }
}

fn require_text(source: &str, expected: ExpectedType) -> ExprResult<()> {
    if expected.accepts_text() {
        Ok(())
    } else {
        Err(ExprError::TypeMismatch {
            expression: source.to_string(),
            expected,
        })
    }
}

fn is_function_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Length of the `&name` reference at the start of `text`, if any.
fn scan_variable(text: &str) -> Option<usize> {
    let name = &text[VAR_SIGIL.len_utf8()..];
    let name_len = name
        .find(|c: char| !c.is_alphanumeric())
        .unwrap_or(name.len());
    (name_len > 0).then_some(VAR_SIGIL.len_utf8() + name_len)
}

/// Length of the `$name(...)` call at the start of `text`, if any.
///
/// A call whose parentheses or quotes never close is a syntax error.
fn scan_call(text: &str) -> ExprResult<Option<usize>> {
    let call = &text[FUNCTION_SIGIL.len_utf8()..];
    let name_len = call
        .find(|c: char| !is_function_name_char(c))
        .unwrap_or(call.len());
    if name_len == 0 || !call[name_len..].starts_with(OPEN) {
        return Ok(None);
    }
    let (_, remainder) = split_arguments(&call[name_len..])?;
    Ok(Some(text.len() - remainder.len()))
}

/// Parse `name(args...)`, the part of a call after the sigil.
fn parse_call(call: &str) -> ExprResult<Expression> {
    let Some(open) = call.find(OPEN) else {
        return Err(ExprError::syntax(format!(
            "expected '{OPEN}' in function call: {FUNCTION_SIGIL}{call}"
        )));
    };
    let name = &call[..open];
    if name.is_empty() || !name.chars().all(is_function_name_char) {
        return Err(ExprError::syntax(format!("invalid function name '{name}'")));
    }

    let (args, remainder) = split_arguments(&call[open..])?;
    if !remainder.trim().is_empty() {
        return Err(ExprError::syntax(format!(
            "unexpected text after function call: {remainder}"
        )));
    }

    let args = args
        .into_iter()
        .map(|arg| parse_expression(Some(arg), ExpectedType::Any))
        .collect::<ExprResult<Vec<_>>>()?;
    Ok(Expression::call(name, args))
}

/// Split a parenthesised argument list.
///
/// `source` starts at the opening parenthesis. Returns the raw argument
/// texts (escapes preserved) and whatever follows the closing parenthesis.
fn split_arguments(source: &str) -> ExprResult<(Vec<&str>, &str)> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = OPEN.len_utf8();

    for (i, c) in source.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            ESCAPE => escaped = true,
            QUOTE => in_string = !in_string,
            _ if in_string => {}
            OPEN => depth += 1,
            CLOSE => {
                depth -= 1;
                if depth == 0 {
                    let last = &source[start..i];
                    if !(args.is_empty() && last.trim().is_empty()) {
                        push_argument(&mut args, last)?;
                    }
                    return Ok((args, &source[i + CLOSE.len_utf8()..]));
                }
            }
            SEPARATOR if depth == 1 => {
                push_argument(&mut args, &source[start..i])?;
                start = i + SEPARATOR.len_utf8();
            }
            _ => {}
        }
    }

    let problem = if in_string {
        "unterminated string literal"
    } else {
        "unbalanced parentheses"
    };
    Err(ExprError::syntax(format!("{problem} in: {source}")))
}

fn push_argument<'s>(args: &mut Vec<&'s str>, arg: &'s str) -> ExprResult<()> {
    if arg.trim().is_empty() {
        return Err(ExprError::syntax(format!(
            "unexpected token '{SEPARATOR}' encountered, expected: expression"
        )));
    }
    args.push(arg);
    Ok(())
}

/// Parse a `"string literal"`; `\"` and `\\` are the only escapes.
fn parse_string(source: &str) -> ExprResult<Expression> {
    let body = &source[QUOTE.len_utf8()..];
    let mut text = String::new();
    let mut chars = body.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some((_, escaped @ (QUOTE | ESCAPE))) => text.push(escaped),
                Some((_, other)) => {
                    text.push(ESCAPE);
                    text.push(other);
                }
                None => break,
            },
            QUOTE => {
                let trailing = &body[i + QUOTE.len_utf8()..];
                if !trailing.trim().is_empty() {
                    return Err(ExprError::syntax(format!(
                        "unexpected text after string literal: {trailing}"
                    )));
                }
                return Ok(Expression::text(text));
            }
            _ => text.push(c),
        }
    }

    Err(ExprError::syntax(format!(
        "unterminated string literal: {source}"
    )))
}
