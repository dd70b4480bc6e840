//! Tokenizer for canonical calculator expressions.
//!
//! Only sees text that already went through [`normalize`](super::normalize),
//! so display glyphs such as `×` or `√` are rejected here.

use super::error::EvaluationError;
use super::evaluation::format_result;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    /// A bare identifier: a function name or a named constant.
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

/// Split a canonical expression into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, EvaluationError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (value, next) = read_number(&chars, i)?;
                tokens.push(Token::Number(value));
                i = next;
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(EvaluationError::new(format!(
                    "unexpected character '{}'",
                    other
                )));
            }
        }
    }

    Ok(tokens)
}

/// Read a decimal literal starting at `start`. Returns the value and the
/// index after the literal.
fn read_number(chars: &[char], start: usize) -> Result<(f64, usize), EvaluationError> {
    let mut i = start;
    let mut seen_dot = false;
    let mut digits = 0;

    while i < chars.len() {
        match chars[i] {
            c if c.is_ascii_digit() => digits += 1,
            '.' if !seen_dot => seen_dot = true,
            '.' => return Err(EvaluationError::new("number with more than one decimal point")),
            _ => break,
        }
        i += 1;
    }

    if digits == 0 {
        return Err(EvaluationError::new("decimal point without digits"));
    }

    if let Some(rendered) = read_rendered_exponent(chars, start, i) {
        return Ok(rendered);
    }

    let literal: String = chars[start..i].iter().collect();
    let value = literal
        .parse::<f64>()
        .map_err(|e| EvaluationError::new(format!("invalid number '{}': {}", literal, e)))?;

    Ok((value, i))
}

/// Read an exponent suffix after the mantissa `chars[start..end]`.
///
/// Only the exact form a result renders as (`1e+21`, `1.5e-7`) is taken as
/// one number. Anything else, such as `2e+1` from pressing `2` `e` `+` `1`,
/// leaves `e` to the identifier branch, where the parser rejects it as a
/// juxtaposition.
fn read_rendered_exponent(chars: &[char], start: usize, end: usize) -> Option<(f64, usize)> {
    if chars.get(end) != Some(&'e') {
        return None;
    }
    match chars.get(end + 1) {
        Some('+') | Some('-') => {}
        _ => return None,
    }

    let mut i = end + 2;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i == end + 2 {
        return None;
    }

    let literal: String = chars[start..i].iter().collect();
    let value = literal.parse::<f64>().ok()?;
    (value.is_finite() && format_result(value) == literal).then_some((value, i))
}
