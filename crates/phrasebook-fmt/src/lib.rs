#![forbid(unsafe_code)]

//! Positional printf-style template formatting.
//!
//! Localization templates carry `%s` and `%d` placeholder tokens that are
//! substituted left-to-right from an argument slice:
//!
//! ```
//! use phrasebook_fmt::{FmtArg, format};
//!
//! let out = format("Hello my name is %s.", &[FmtArg::Str("Bob")]);
//! assert_eq!(out, "Hello my name is Bob.");
//!
//! let out = format("%s has %d cats.", &["Ann".into(), 3u64.into()]);
//! assert_eq!(out, "Ann has 3 cats.");
//! ```
//!
//! # Token Contract
//!
//! | input | behavior |
//! |---|---|
//! | `%s`, `%d` | consume the next argument; substitute its display form |
//! | `%%` | literal `%` |
//! | `%s`/`%d` with no argument left | token passes through verbatim |
//! | any other `%x` sequence | passes through verbatim, consumes nothing |
//! | surplus arguments | ignored |
//!
//! `%d` does not re-render its argument as an integer; the two tokens differ
//! only in intent. The distinction matters to callers that inspect templates
//! for a numeric slot (see [`has_numeric_token`]) before appending a count
//! argument.
//!
//! Formatting never fails and never panics; every template/argument
//! combination produces a string.

use std::fmt;

/// A single positional argument for [`format`].
///
/// All variants are `Copy`; string arguments borrow from the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FmtArg<'a> {
    /// Borrowed text, substituted as-is.
    Str(&'a str),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer (counts land here).
    Uint(u64),
    /// Floating point; renders via the standard `Display` (`3.5`, `3`).
    Float(f64),
}

impl fmt::Display for FmtArg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FmtArg::Str(s) => f.write_str(s),
            FmtArg::Int(n) => write!(f, "{n}"),
            FmtArg::Uint(n) => write!(f, "{n}"),
            FmtArg::Float(n) => write!(f, "{n}"),
        }
    }
}

impl<'a> From<&'a str> for FmtArg<'a> {
    fn from(value: &'a str) -> Self {
        FmtArg::Str(value)
    }
}

impl<'a> From<&'a String> for FmtArg<'a> {
    fn from(value: &'a String) -> Self {
        FmtArg::Str(value.as_str())
    }
}

impl From<i64> for FmtArg<'_> {
    fn from(value: i64) -> Self {
        FmtArg::Int(value)
    }
}

impl From<i32> for FmtArg<'_> {
    fn from(value: i32) -> Self {
        FmtArg::Int(i64::from(value))
    }
}

impl From<u64> for FmtArg<'_> {
    fn from(value: u64) -> Self {
        FmtArg::Uint(value)
    }
}

impl From<u32> for FmtArg<'_> {
    fn from(value: u32) -> Self {
        FmtArg::Uint(u64::from(value))
    }
}

impl From<usize> for FmtArg<'_> {
    fn from(value: usize) -> Self {
        FmtArg::Uint(value as u64)
    }
}

impl From<f64> for FmtArg<'_> {
    fn from(value: f64) -> Self {
        FmtArg::Float(value)
    }
}

impl From<f32> for FmtArg<'_> {
    fn from(value: f32) -> Self {
        FmtArg::Float(f64::from(value))
    }
}

/// Substitute `%s`/`%d` tokens in `template` with `args`, left to right.
///
/// See the [module docs](self) for the full token contract. Unmatched
/// placeholders stay in the output verbatim so a missing argument degrades
/// visibly instead of silently dropping text.
#[must_use]
pub fn format(template: &str, args: &[FmtArg<'_>]) -> String {
    use std::fmt::Write as _;

    let mut out = String::with_capacity(template.len());
    let mut next = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(&tok) if tok == 's' || tok == 'd' => {
                chars.next();
                match next.next() {
                    Some(arg) => {
                        let _ = write!(out, "{arg}");
                    }
                    None => {
                        out.push('%');
                        out.push(tok);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    out
}

/// Whether `template` contains a real `%d` token.
///
/// Escape-aware: `%%d` is a literal percent followed by `d`, not a numeric
/// placeholder. Used by callers deciding whether to append a count argument.
#[must_use]
pub fn has_numeric_token(template: &str) -> bool {
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        match chars.peek() {
            Some('d') => return true,
            // Consume the escaped percent so "%%d" is not misread.
            Some('%') => {
                chars.next();
            }
            _ => {}
        }
    }
    false
}

// ============================================================================
// Tests
// ============================================================================
