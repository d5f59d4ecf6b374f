//! NUMBER literal interpretation
//!
//! Turns the raw text of a NUMBER token into [`Expr::ConstantInt`] or
//! [`Expr::ConstantFloat`]. Integers are arbitrary precision. Radix
//! prefixes are two characters (`0X`, `0O`, `0B`) and the digits follow
//! them; see [`RadixDetection`] for how the radix is chosen.

use num_bigint::BigInt;

use super::ast::Expr;
use super::config::RadixDetection;
use super::error::ParseError;

/// Interpret a NUMBER lexeme found on `line`.
pub fn interpret_number(
    text: &str,
    line: usize,
    detection: RadixDetection,
) -> Result<Expr, ParseError> {
    match detection {
        RadixDetection::Substring => interpret_substring(text, line),
        RadixDetection::Prefix => interpret_prefix(text, line),
    }
}

fn interpret_substring(text: &str, line: usize) -> Result<Expr, ParseError> {
    if text.contains('.') || text.contains('E') {
        parse_float(text, line)
    } else if text.contains('X') {
        parse_radix(text, 2, 16, line)
    } else if text.contains('O') {
        parse_radix(text, 2, 8, line)
    } else if text.contains('B') {
        parse_radix(text, 2, 2, line)
    } else {
        parse_radix(text, 0, 10, line)
    }
}

fn interpret_prefix(text: &str, line: usize) -> Result<Expr, ParseError> {
    let mut chars = text.chars();
    let radix = match (chars.next(), chars.next()) {
        (Some('0'), Some('x' | 'X')) => Some(16),
        (Some('0'), Some('o' | 'O')) => Some(8),
        (Some('0'), Some('b' | 'B')) => Some(2),
        _ => None,
    };

    match radix {
        Some(radix) => parse_radix(text, 2, radix, line),
        None if text.contains(['.', 'E', 'e']) => parse_float(text, line),
        None => parse_radix(text, 0, 10, line),
    }
}

fn parse_float(text: &str, line: usize) -> Result<Expr, ParseError> {
    reject_sign(text, text, line)?;
    text.parse::<f64>()
        .map(Expr::ConstantFloat)
        .map_err(|err| number_error(text, line, err.to_string()))
}

/// Parse the digits after the first `skip` characters in base `radix`.
fn parse_radix(text: &str, skip: usize, radix: u32, line: usize) -> Result<Expr, ParseError> {
    let digits = text
        .get(skip..)
        .ok_or_else(|| number_error(text, line, "missing radix prefix".to_string()))?;
    reject_sign(digits, text, line)?;

    BigInt::parse_bytes(digits.as_bytes(), radix)
        .map(Expr::ConstantInt)
        .ok_or_else(|| number_error(text, line, format!("invalid digits for base {}", radix)))
}

// Both `f64::from_str` and `BigInt::parse_bytes` take a leading sign, which
// no NUMBER lexeme carries.
fn reject_sign(digits: &str, text: &str, line: usize) -> Result<(), ParseError> {
    if digits.starts_with(['+', '-']) {
        return Err(number_error(text, line, "unexpected sign".to_string()));
    }
    Ok(())
}

fn number_error(text: &str, line: usize, reason: String) -> ParseError {
    ParseError::NumberFormat {
        text: text.to_string(),
        line,
        reason,
    }
}
