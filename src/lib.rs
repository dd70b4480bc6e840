//! A keypad calculator with normal and scientific modes, a persistent
//! history of recent calculations and a light/dark preference.

pub mod calculator;
pub mod config;
pub mod display;
pub mod history;
pub mod keypad;
pub mod repl;
pub mod session;
pub mod settings;
pub mod store;

pub use calculator::{Calculation, EvaluationError, Outcome, evaluate_expression};
pub use config::Config;
pub use display::DisplaySink;
pub use history::{HISTORY_CAP, History, HistoryEntry};
pub use session::Session;
pub use settings::{Mode, Theme};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
