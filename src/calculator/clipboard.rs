//! Copying results to the system clipboard.

use arboard::Clipboard;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to access clipboard: {0}")]
    Access(#[source] arboard::Error),
    #[error("failed to copy to clipboard: {0}")]
    Copy(#[source] arboard::Error),
}

/// Copy a calculation result to the system clipboard.
pub fn copy_to_clipboard(result: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(ClipboardError::Access)?;
    clipboard
        .set_text(result.to_string())
        .map_err(ClipboardError::Copy)?;
    tracing::debug!(result, "copied result to clipboard");
    Ok(())
}
