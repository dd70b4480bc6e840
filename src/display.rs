//! The display surface the session reports to.

/// Shown in place of the buffer when evaluation fails.
pub const ERROR_TEXT: &str = "Error";

/// Receives the string to show each time the buffer or a result changes.
pub trait DisplaySink {
    fn show(&mut self, text: &str);
}

/// Collects everything shown, most recent last.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub shown: Vec<String>,
}

impl RecordingSink {
    pub fn last(&self) -> Option<&str> {
        self.shown.last().map(String::as_str)
    }
}

impl DisplaySink for RecordingSink {
    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }
}

/// What a display shows for `buffer`: the buffer itself, or `0` when empty.
pub fn buffer_text(buffer: &str) -> &str {
    if buffer.is_empty() { "0" } else { buffer }
}

/// Check if `text` is a plain number (no operators or names), i.e. a
/// result rather than an expression or an error.
pub fn is_plain_number(text: &str) -> bool {
    let to_check = text.strip_prefix('-').unwrap_or(text);

    !to_check.is_empty()
        && to_check.starts_with(|c: char| c.is_ascii_digit())
        && to_check.chars().all(|c| c.is_ascii_digit() || c == '.')
}
