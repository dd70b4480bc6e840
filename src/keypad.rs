//! Keypad layouts and key dispatch.
//!
//! Buttons are identified by id; the label is only what a front end shows.
//! Operator buttons carry the ASCII operator as id and the glyph as label.

use crate::settings::Mode;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyClass {
    Num,
    Operator,
    Clear,
    Equal,
}

/// A button that can be displayed on the keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Button {
    pub id: &'static str,
    pub label: &'static str,
    pub class: KeyClass,
    /// Grid rows covered; 1 for every button but the tall `=`.
    pub row_span: u8,
}

impl Button {
    /// Label for a text listing. Control keys are bracketed and a key
    /// spanning several rows is marked with `↕`.
    pub fn caption(&self) -> String {
        let label = match self.class {
            KeyClass::Clear | KeyClass::Equal => format!("[{}]", self.label),
            KeyClass::Num | KeyClass::Operator => self.label.to_string(),
        };
        if self.row_span > 1 {
            format!("{}↕", label)
        } else {
            label
        }
    }
}

const fn button(id: &'static str, label: &'static str, class: KeyClass) -> Button {
    Button {
        id,
        label,
        class,
        row_span: 1,
    }
}

const fn num(id: &'static str) -> Button {
    button(id, id, KeyClass::Num)
}

const fn op(id: &'static str, label: &'static str) -> Button {
    button(id, label, KeyClass::Operator)
}

/// Basic arithmetic layout, four columns.
pub const NORMAL_BUTTONS: &[Button] = &[
    button("clear", "C", KeyClass::Clear),
    op("/", "÷"),
    op("*", "×"),
    op("back", "⌫"),
    num("7"),
    num("8"),
    num("9"),
    op("-", "−"),
    num("4"),
    num("5"),
    num("6"),
    op("+", "+"),
    num("1"),
    num("2"),
    num("3"),
    Button {
        id: "=",
        label: "=",
        class: KeyClass::Equal,
        row_span: 2,
    },
    op("(", "("),
    num("0"),
    op(")", ")"),
];

/// Scientific layout, four columns.
pub const SCIENTIFIC_BUTTONS: &[Button] = &[
    button("clear", "C", KeyClass::Clear),
    op("pi", "π"),
    op("e", "e"),
    op("back", "⌫"),
    op("sin", "sin"),
    op("cos", "cos"),
    op("tan", "tan"),
    op("^", "^"),
    num("7"),
    num("8"),
    num("9"),
    op("/", "÷"),
    num("4"),
    num("5"),
    num("6"),
    op("*", "×"),
    num("1"),
    num("2"),
    num("3"),
    op("-", "−"),
    op("sqrt", "√"),
    num("0"),
    op("log", "log"),
    op("+", "+"),
    op("(", "("),
    op(")", ")"),
    button("=", "=", KeyClass::Equal),
];

/// The layout offered in `mode`.
pub fn buttons(mode: Mode) -> &'static [Button] {
    match mode {
        Mode::Normal => NORMAL_BUTTONS,
        Mode::Scientific => SCIENTIFIC_BUTTONS,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeypadError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
}

/// Scientific helper keys that insert a function call or constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionKey {
    Sin,
    Cos,
    Tan,
    Log,
    Sqrt,
    Pi,
    E,
}

impl FunctionKey {
    pub fn from_name(name: &str) -> Result<Self, KeypadError> {
        match name {
            "sin" => Ok(Self::Sin),
            "cos" => Ok(Self::Cos),
            "tan" => Ok(Self::Tan),
            "log" => Ok(Self::Log),
            "sqrt" | "√" => Ok(Self::Sqrt),
            "pi" | "π" => Ok(Self::Pi),
            "e" => Ok(Self::E),
            other => Err(KeypadError::UnknownFunction(other.to_string())),
        }
    }

    /// Text appended to the buffer. Functions open a call so the argument
    /// can be typed next; constants insert their display token.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Sin => "sin(",
            Self::Cos => "cos(",
            Self::Tan => "tan(",
            Self::Log => "log(",
            Self::Sqrt => "√(",
            Self::Pi => "π",
            Self::E => "e",
        }
    }
}

/// What pressing a key does to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Clear,
    Back,
    Evaluate,
    Function(FunctionKey),
    Insert(String),
}

impl KeyAction {
    /// Map a button id to its action. Ids without special meaning are
    /// appended verbatim.
    pub fn from_id(id: &str) -> Self {
        match id {
            "clear" => Self::Clear,
            "back" => Self::Back,
            "=" => Self::Evaluate,
            other => match FunctionKey::from_name(other) {
                Ok(key) => Self::Function(key),
                Err(_) => Self::Insert(other.to_string()),
            },
        }
    }
}

/// A physical keyboard key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyboardKey {
    Char(char),
    Backspace,
    Enter,
}

/// Characters a keyboard may type directly into the buffer.
pub const KEYBOARD_CHARS: &str = "0123456789+-*/().^";

/// Filter a keyboard key. Characters outside [`KEYBOARD_CHARS`] are ignored.
pub fn keyboard_action(key: KeyboardKey) -> Option<KeyAction> {
    match key {
        KeyboardKey::Char(c) if KEYBOARD_CHARS.contains(c) => {
            Some(KeyAction::Insert(c.to_string()))
        }
        KeyboardKey::Char(_) => None,
        KeyboardKey::Backspace => Some(KeyAction::Back),
        KeyboardKey::Enter => Some(KeyAction::Evaluate),
    }
}
