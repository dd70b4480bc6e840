//! Translation from display notation to the canonical expression form.
//!
//! The buffer holds what the user sees (`×`, `÷`, `−`, `π`, `√(`, `log(`).
//! The parser only understands ASCII operators and the canonical function
//! names, so every glyph is rewritten here before tokenizing.

use lazy_static::lazy_static;
use regex::Regex;
use std::f64::consts::PI;

/// Operator glyphs and their canonical ASCII operators.
const OPERATOR_GLYPHS: &[(&str, &str)] = &[("×", "*"), ("÷", "/"), ("−", "-"), ("**", "^")];

lazy_static! {
    /// `π` is substituted as a parenthesized literal so that `2π` stays a
    /// juxtaposition error instead of silently becoming `23.14…`.
    static ref PI_LITERAL: String = format!("({})", PI);

    /// `log(` is base 10. Anchored at a word boundary so an already
    /// canonical `log10(` is never rewritten.
    static ref LOG_CALL: Regex = Regex::new(r"\blog\(").unwrap();
}

/// Rewrite display glyphs into the canonical form understood by the parser.
pub fn normalize(expression: &str) -> String {
    let mut canonical = expression.to_string();

    for (glyph, operator) in OPERATOR_GLYPHS {
        canonical = canonical.replace(glyph, operator);
    }

    canonical = canonical.replace('π', &PI_LITERAL);
    canonical = canonical.replace("√(", "sqrt(");
    // `ln(`, `sin(`, `cos(` and `tan(` already use their canonical names.
    LOG_CALL.replace_all(&canonical, "log10(").into_owned()
}
