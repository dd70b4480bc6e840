//! Persisted preferences: keypad mode and display theme.

use std::fmt;

/// Which keypad layout is offered. Does not change how the buffer is
/// evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Scientific,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Scientific => "scientific",
        }
    }

    /// Parse a stored value. Anything unrecognized falls back to Normal.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("scientific") => Self::Scientific,
            _ => Self::Normal,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Scientific,
            Self::Scientific => Self::Normal,
        }
    }

    /// Label for a mode toggle.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Scientific => "Scientific",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Only the literal `"dark"` reads back as Dark.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Icon for a theme toggle: offers the opposite theme.
    pub const fn toggle_icon(self) -> &'static str {
        match self {
            Self::Light => "🌙",
            Self::Dark => "☀️",
        }
    }
}
