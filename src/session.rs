//! The calculator session: buffer, history and preferences.
//!
//! A [`Session`] is built once from a [`KeyValueStore`] and is the only
//! thing that mutates calculator state. Store failures are logged and
//! otherwise ignored so the calculator keeps working without persistence.

use crate::calculator::{EvaluationError, Outcome, evaluate_expression};
use crate::display::{DisplaySink, ERROR_TEXT, buffer_text};
use crate::history::{History, HistoryEntry};
use crate::keypad::{FunctionKey, KeyAction, KeyboardKey, KeypadError, keyboard_action};
use crate::settings::{Mode, Theme};
use crate::store::{HISTORY_KEY, KeyValueStore, MODE_KEY, THEME_KEY};

pub struct Session {
    buffer: String,
    mode: Mode,
    theme: Theme,
    history: History,
    store: Box<dyn KeyValueStore>,
}

impl Session {
    /// Restore mode, theme and history from `store`.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let history = match read(&*store, HISTORY_KEY) {
            Some(json) => History::from_json(&json).unwrap_or_else(|err| {
                tracing::warn!("Discarding unreadable history: {}", err);
                History::new()
            }),
            None => History::new(),
        };
        let mode = Mode::from_stored(read(&*store, MODE_KEY).as_deref());
        let theme = Theme::from_stored(read(&*store, THEME_KEY).as_deref());

        tracing::debug!(
            entries = history.len(),
            mode = mode.as_str(),
            theme = theme.as_str(),
            "session loaded"
        );

        Self {
            buffer: String::new(),
            mode,
            theme,
            history,
            store,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// What the display shows for the current buffer.
    pub fn display_text(&self) -> &str {
        buffer_text(&self.buffer)
    }

    /// Append input without validating it; errors surface on evaluation.
    pub fn append(&mut self, token: &str) {
        self.buffer.push_str(token);
    }

    /// Remove the last character. No-op on an empty buffer.
    pub fn delete_last(&mut self) {
        self.buffer.pop();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Insert a function call (`sin(`, `√(`, ...) or a constant (`π`, `e`).
    pub fn insert_function_call(&mut self, name: &str) -> Result<(), KeypadError> {
        let key = FunctionKey::from_name(name)?;
        self.append(key.token());
        Ok(())
    }

    /// Evaluate the buffer.
    ///
    /// On success the calculation is recorded in history, history is
    /// persisted and the buffer is replaced by the result. On error nothing
    /// changes. An empty buffer yields [`Outcome::Empty`] and records nothing.
    pub fn evaluate(&mut self) -> Result<Outcome, EvaluationError> {
        let outcome = match evaluate_expression(&self.buffer) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(buffer = %self.buffer, reason = err.reason(), "evaluation failed");
                return Err(err);
            }
        };

        if let Outcome::Value(calc) = &outcome {
            tracing::debug!(expression = %calc.expression, result = %calc.result, "evaluated");
            self.history.push(HistoryEntry::new(
                calc.expression.clone(),
                calc.result.clone(),
                now_millis(),
            ));
            self.persist_history();
            self.buffer = calc.result.clone();
        }

        Ok(outcome)
    }

    /// Load the result of history entry `index` (newest first) into the
    /// buffer. Out of range is a no-op.
    pub fn use_entry(&mut self, index: usize) -> Option<&str> {
        let result = self.history.get(index)?.result.clone();
        self.buffer = result;
        Some(self.buffer.as_str())
    }

    /// Delete history entry `index`. Returns whether anything was removed.
    pub fn remove_entry(&mut self, index: usize) -> bool {
        if self.history.remove(index).is_none() {
            return false;
        }
        self.persist_history();
        true
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.persist_history();
    }

    /// Switch between Normal and Scientific. The buffer is not touched.
    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        self.write(MODE_KEY, self.mode.as_str());
        self.mode
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.write(THEME_KEY, self.theme.as_str());
        self.theme
    }

    /// Apply a key action and report the resulting display text to `sink`.
    ///
    /// A failed evaluation shows [`ERROR_TEXT`]; the buffer is kept so the
    /// caller can re-render it later with [`Session::display_text`].
    pub fn apply(&mut self, action: KeyAction, sink: &mut dyn DisplaySink) {
        match action {
            KeyAction::Clear => self.clear(),
            KeyAction::Back => self.delete_last(),
            KeyAction::Insert(text) => self.append(&text),
            KeyAction::Function(key) => self.append(key.token()),
            KeyAction::Evaluate => match self.evaluate() {
                Ok(Outcome::Value(calc)) => {
                    sink.show(&calc.result);
                    return;
                }
                Ok(Outcome::Empty) | Err(_) => {
                    sink.show(ERROR_TEXT);
                    return;
                }
            },
        }
        sink.show(self.display_text());
    }

    /// Press the keypad button with `id`.
    pub fn press(&mut self, id: &str, sink: &mut dyn DisplaySink) {
        self.apply(KeyAction::from_id(id), sink);
    }

    /// Handle a keyboard key; keys outside the accepted set are ignored.
    pub fn key(&mut self, key: KeyboardKey, sink: &mut dyn DisplaySink) {
        if let Some(action) = keyboard_action(key) {
            self.apply(action, sink);
        }
    }

    fn persist_history(&mut self) {
        match self.history.to_json() {
            Ok(json) => self.write(HISTORY_KEY, &json),
            Err(err) => tracing::warn!("Failed to encode history: {}", err),
        }
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            tracing::warn!(key, "Failed to persist: {}", err);
        }
    }
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    store.get(key).unwrap_or_else(|err| {
        tracing::warn!(key, "Failed to read from store: {}", err);
        None
    })
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::RecordingSink;
    use crate::history::HISTORY_CAP;
    use crate::store::{MemoryStore, StoreError};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// A store whose contents outlive the session, for reload tests.
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<HashMap<String, String>>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.0.borrow().get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.0.borrow_mut().insert(key.into(), value.into());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.0.borrow_mut().remove(key);
            Ok(())
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::NoDataDir)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::NoDataDir)
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::NoDataDir)
        }
    }

    fn session() -> Session {
        Session::load(Box::new(MemoryStore::new()))
    }

    fn session_with(input: &str) -> Session {
        let mut session = session();
        session.append(input);
        session
    }

    #[test]
    fn test_evaluate_replaces_buffer_and_records() {
        let mut session = session_with("2+3×4");
        let outcome = session.evaluate().unwrap();
        assert_eq!(outcome.calculation().unwrap().result, "14");
        assert_eq!(session.buffer(), "14");

        let newest = session.history().get(0).unwrap();
        assert_eq!(newest.expression, "2+3×4");
        assert_eq!(newest.result, "14");
        assert!(newest.timestamp > 0);
    }

    #[test]
    fn test_empty_buffer_is_noop() {
        let mut session = session();
        assert_eq!(session.evaluate().unwrap(), Outcome::Empty);
        assert!(session.history().is_empty());
        assert_eq!(session.buffer(), "");
    }

    #[test]
    fn test_error_keeps_buffer_and_history() {
        let mut session = session_with("5/0");
        assert!(session.evaluate().is_err());
        assert_eq!(session.buffer(), "5/0");
        assert!(session.history().is_empty());

        session.clear();
        session.insert_function_call("sqrt").unwrap();
        session.append("-1)");
        assert_eq!(session.buffer(), "√(-1)");
        assert!(session.evaluate().is_err());
    }

    #[test]
    fn test_chained_calculation() {
        let mut session = session_with("2+2");
        session.evaluate().unwrap();
        session.append("*10");
        session.evaluate().unwrap();
        assert_eq!(session.buffer(), "40");
        assert_eq!(session.history().get(0).unwrap().expression, "4*10");
    }

    #[test]
    fn test_plain_number_still_recorded() {
        let mut session = session_with("14");
        session.evaluate().unwrap();
        session.evaluate().unwrap();
        assert_eq!(session.buffer(), "14");
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_history_is_capped() {
        let mut session = session();
        for n in 0..HISTORY_CAP + 5 {
            session.clear();
            session.append(&format!("{n}+1"));
            session.evaluate().unwrap();
        }
        assert_eq!(session.history().len(), HISTORY_CAP);
        assert_eq!(
            session.history().get(0).unwrap().expression,
            format!("{}+1", HISTORY_CAP + 4)
        );
        assert_eq!(
            session.history().get(HISTORY_CAP - 1).unwrap().expression,
            "5+1"
        );
    }

    #[test]
    fn test_delete_last() {
        let mut session = session();
        session.delete_last();
        assert_eq!(session.buffer(), "");
        session.insert_function_call("pi").unwrap();
        session.append("2");
        session.delete_last();
        session.delete_last();
        assert_eq!(session.buffer(), "");
    }

    #[test]
    fn test_insert_function_call() {
        let mut session = session();
        session.insert_function_call("sin").unwrap();
        session.append("0)+");
        session.insert_function_call("log").unwrap();
        session.append("100)");
        assert_eq!(session.buffer(), "sin(0)+log(100)");
        assert_eq!(session.evaluate().unwrap().calculation().unwrap().result, "2");

        let err = session.insert_function_call("cosh").unwrap_err();
        assert_eq!(err, KeypadError::UnknownFunction("cosh".into()));
        assert_eq!(session.buffer(), "2");
    }

    #[test]
    fn test_use_entry() {
        let mut session = session_with("6×7");
        session.evaluate().unwrap();
        session.clear();

        assert_eq!(session.use_entry(0), Some("42"));
        assert_eq!(session.buffer(), "42");
        assert_eq!(session.use_entry(3), None);
        assert_eq!(session.buffer(), "42");
    }

    #[test]
    fn test_remove_entry() {
        let mut session = session();
        for expr in ["1+1", "2+2", "3+3"] {
            session.clear();
            session.append(expr);
            session.evaluate().unwrap();
        }

        for index in [3, 10, usize::MAX] {
            assert!(!session.remove_entry(index));
            assert_eq!(session.history().len(), 3);
        }
        assert!(session.remove_entry(1));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().get(1).unwrap().result, "2");
    }

    #[test]
    fn test_history_survives_reload() {
        let store = SharedStore::default();
        let mut session = Session::load(Box::new(store.clone()));
        for expr in ["1+1", "2×3", "√(81)"] {
            session.clear();
            session.append(expr);
            session.evaluate().unwrap();
        }
        let before = session.history().clone();

        let reloaded = Session::load(Box::new(store));
        assert_eq!(reloaded.history(), &before);
        assert_eq!(reloaded.history().get(0).unwrap().result, "9");
    }

    #[test]
    fn test_clear_history_persists() {
        let store = SharedStore::default();
        let mut session = Session::load(Box::new(store.clone()));
        session.append("1+1");
        session.evaluate().unwrap();
        session.clear_history();

        assert!(session.history().is_empty());
        assert_eq!(store.get(HISTORY_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_mode_and_theme_persist() {
        let store = SharedStore::default();
        let mut session = Session::load(Box::new(store.clone()));
        session.append("1+");
        assert_eq!(session.toggle_mode(), Mode::Scientific);
        assert_eq!(session.toggle_theme(), Theme::Dark);
        assert_eq!(session.buffer(), "1+");

        let reloaded = Session::load(Box::new(store));
        assert_eq!(reloaded.mode(), Mode::Scientific);
        assert_eq!(reloaded.theme(), Theme::Dark);
    }

    #[test]
    fn test_corrupt_history_loads_empty() {
        let mut store = SharedStore::default();
        store.set(HISTORY_KEY, "{oops").unwrap();
        let session = Session::load(Box::new(store));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_store_failures_degrade_silently() {
        let mut session = Session::load(Box::new(FailingStore));
        session.append("2^8");
        assert_eq!(
            session.evaluate().unwrap().calculation().unwrap().result,
            "256"
        );
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.toggle_mode(), Mode::Scientific);
    }

    #[test]
    fn test_press_buttons() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        for id in ["7", "*", "6", "="] {
            session.press(id, &mut sink);
        }
        assert_eq!(sink.shown, vec!["7", "7*", "7*6", "42"]);

        session.press("clear", &mut sink);
        assert_eq!(sink.last(), Some("0"));
        session.press("sqrt", &mut sink);
        assert_eq!(sink.last(), Some("√("));
        session.press("back", &mut sink);
        assert_eq!(sink.last(), Some("√"));
    }

    #[test]
    fn test_error_display_then_buffer() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        for id in ["1", "/", "0", "="] {
            session.press(id, &mut sink);
        }
        assert_eq!(sink.last(), Some(ERROR_TEXT));
        assert_eq!(session.display_text(), "1/0");
    }

    #[test]
    fn test_e_key_after_digit_is_error() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        for id in ["2", "e", "+", "1", "="] {
            session.press(id, &mut sink);
        }
        assert_eq!(sink.last(), Some(ERROR_TEXT));
        assert_eq!(session.buffer(), "2e+1");
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_exponent_result_chains() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        for id in ["1", "0", "^", "2", "1", "="] {
            session.press(id, &mut sink);
        }
        assert_eq!(sink.last(), Some("1e+21"));
        for id in ["*", "2", "="] {
            session.press(id, &mut sink);
        }
        assert_eq!(sink.last(), Some("2e+21"));
    }

    #[test]
    fn test_keyboard_keys() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        for c in "(1+2)x^2".chars() {
            session.key(KeyboardKey::Char(c), &mut sink);
        }
        assert_eq!(session.buffer(), "(1+2)^2");
        session.key(KeyboardKey::Enter, &mut sink);
        assert_eq!(sink.last(), Some("9"));
        session.key(KeyboardKey::Backspace, &mut sink);
        assert_eq!(sink.last(), Some("0"));
    }
}
