//! Calculator engine for evaluating keypad expressions.
//!
//! This module provides functionality to:
//! - Normalize display glyphs (`×`, `÷`, `√(`, `π`) into a canonical form
//! - Parse and evaluate the canonical form with a closed grammar
//! - Render results and copy them to the clipboard

mod clipboard;
mod error;
mod evaluation;
mod lexer;
mod normalize;
mod parser;

pub use clipboard::{ClipboardError, copy_to_clipboard};
pub use error::EvaluationError;
pub use evaluation::{Calculation, Outcome, evaluate_expression, format_result, group_digits};
pub use normalize::normalize;
