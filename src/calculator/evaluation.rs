//! Expression evaluation.
//!
//! Runs the full pipeline on a buffer: normalize display glyphs, tokenize,
//! parse, evaluate, then classify the number as a result or an error.

use super::error::EvaluationError;
use super::lexer::tokenize;
use super::normalize::normalize;
use super::parser::parse;

/// A successful calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct Calculation {
    /// The buffer text as entered, before normalization.
    pub expression: String,
    /// The numeric value.
    pub value: f64,
    /// Canonical rendering of `value`; this is what goes back into the buffer.
    pub result: String,
}

impl Calculation {
    /// The result formatted for display (with thousand separators).
    pub fn display_result(&self) -> String {
        group_digits(&self.result)
    }
}

/// Result of evaluating a buffer that did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Nothing to evaluate (empty or whitespace-only input).
    Empty,
    /// Evaluation produced a finite number.
    Value(Calculation),
}

impl Outcome {
    /// Check if this is a successful result.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// The calculation, if there was one.
    pub fn calculation(&self) -> Option<&Calculation> {
        match self {
            Self::Value(calc) => Some(calc),
            Self::Empty => None,
        }
    }
}

/// Evaluate a calculator expression.
///
/// Returns `Ok(Outcome::Empty)` for blank input. Malformed input and
/// non-finite results (division by zero, `√` of a negative, `log` of zero)
/// both yield the same [`EvaluationError`].
pub fn evaluate_expression(input: &str) -> Result<Outcome, EvaluationError> {
    if input.trim().is_empty() {
        return Ok(Outcome::Empty);
    }

    let canonical = normalize(input);
    let tokens = tokenize(&canonical)?;
    let value = parse(&tokens)?.eval();

    if value.is_nan() {
        return Err(EvaluationError::new("result is not a number"));
    }
    if value.is_infinite() {
        return Err(EvaluationError::new(if value.is_sign_positive() {
            "result is Infinity"
        } else {
            "result is -Infinity"
        }));
    }

    Ok(Outcome::Value(Calculation {
        expression: input.to_string(),
        result: format_result(value),
        value,
    }))
}

/// Render a finite number in its canonical decimal form.
///
/// Uses the shortest digit string that round-trips, in plain notation for
/// magnitudes in `[1e-6, 1e21)` and exponent notation (`1e+21`, `1.5e-7`)
/// outside it. Negative zero renders as `0`.
pub fn format_result(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", value);
    }

    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

/// Insert thousand separators into the integer part of a canonical result.
///
/// Exponent forms are returned unchanged.
pub fn group_digits(result: &str) -> String {
    if result.contains('e') {
        return result.to_string();
    }

    let (sign, unsigned) = match result.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", result),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(dot_pos) => unsigned.split_at(dot_pos),
        None => (unsigned, ""),
    };

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let int_grouped: String = grouped.chars().rev().collect();
    format!("{}{}{}", sign, int_grouped, frac_part)
}
