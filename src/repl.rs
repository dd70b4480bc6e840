//! Line-oriented front end.
//!
//! A line starting with an operator continues the current buffer (so a
//! result can be chained), any other line starts a fresh expression. Lines
//! beginning with `:` are commands.

use crate::calculator::{copy_to_clipboard, group_digits};
use crate::display::{DisplaySink, is_plain_number};
use crate::keypad::{KeyAction, KeyboardKey, buttons};
use crate::session::Session;
use std::io::{self, BufRead, Write};

const CHAIN_PREFIXES: &[char] = &['+', '-', '*', '/', '^', '×', '÷', '−'];

pub const HELP: &str = "\
Type an expression and press Enter. Start a line with an operator to
continue from the last result.

Commands:
  :mode            toggle Normal/Scientific keypad
  :theme           toggle light/dark
  :buttons         list the keypad buttons of the current mode
  :press ID        press a keypad button (e.g. :press sqrt)
  :keys TEXT       type characters as keyboard keys (no Enter)
  :history         list recent calculations
  :use N           load history entry N into the buffer
  :del N           delete history entry N
  :clear-history   delete all history
  :clear           clear the buffer
  :copy            copy the latest result to the clipboard
  :help            show this help
  :quit            exit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Mode,
    Theme,
    Buttons,
    Press(String),
    Keys(String),
    History,
    Use(usize),
    Delete(usize),
    ClearHistory,
    Clear,
    Copy,
    Help,
    Quit,
}

impl Command {
    /// Parse a `:command` line (without the colon).
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        let (name, arg) = match input.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (input, ""),
        };

        let index = |arg: &str| {
            arg.parse::<usize>()
                .map_err(|_| format!("expected an entry number, got '{}'", arg))
        };

        match name {
            "mode" => Ok(Self::Mode),
            "theme" => Ok(Self::Theme),
            "buttons" => Ok(Self::Buttons),
            "press" if !arg.is_empty() => Ok(Self::Press(arg.to_string())),
            "keys" => Ok(Self::Keys(arg.to_string())),
            "history" => Ok(Self::History),
            "use" => index(arg).map(Self::Use),
            "del" => index(arg).map(Self::Delete),
            "clear-history" => Ok(Self::ClearHistory),
            "clear" => Ok(Self::Clear),
            "copy" => Ok(Self::Copy),
            "help" => Ok(Self::Help),
            "quit" | "q" => Ok(Self::Quit),
            "press" => Err("usage: :press ID".to_string()),
            other => Err(format!("unknown command ':{}'", other)),
        }
    }
}

/// Writes every display update as its own line.
pub struct LineSink<W: Write> {
    out: W,
    group_digits: bool,
}

impl<W: Write> LineSink<W> {
    pub fn new(out: W, group_digits: bool) -> Self {
        Self { out, group_digits }
    }

    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{}", text) {
            tracing::warn!("Failed to write output: {}", err);
        }
    }
}

impl<W: Write> DisplaySink for LineSink<W> {
    fn show(&mut self, text: &str) {
        if self.group_digits && is_plain_number(text) {
            self.line(&group_digits(text));
        } else {
            self.line(text);
        }
    }
}

pub struct Repl<W: Write> {
    session: Session,
    sink: LineSink<W>,
    history_limit: usize,
}

impl<W: Write> Repl<W> {
    pub fn new(session: Session, sink: LineSink<W>, history_limit: usize) -> Self {
        Self {
            session,
            sink,
            history_limit,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read lines until end of input or `:quit`.
    pub fn run(&mut self, input: impl BufRead) -> io::Result<()> {
        for line in input.lines() {
            if !self.handle_line(&line?) {
                break;
            }
        }
        Ok(())
    }

    /// Handle one input line. Returns `false` when the user asked to quit.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let line = line.trim();

        if let Some(command) = line.strip_prefix(':') {
            return match Command::parse(command) {
                Ok(command) => self.run_command(command),
                Err(message) => {
                    self.sink.line(&message);
                    true
                }
            };
        }

        if line.is_empty() {
            if self.session.buffer().is_empty() {
                self.sink.show(self.session.display_text());
                return true;
            }
        } else {
            if !line.starts_with(CHAIN_PREFIXES) {
                self.session.clear();
            }
            self.session.append(line);
        }
        self.session.apply(KeyAction::Evaluate, &mut self.sink);
        true
    }

    fn run_command(&mut self, command: Command) -> bool {
        match command {
            Command::Mode => {
                let mode = self.session.toggle_mode();
                self.sink.line(&format!("Mode: {}", mode));
            }
            Command::Theme => {
                let theme = self.session.toggle_theme();
                self.sink
                    .line(&format!("Theme: {} {}", theme.as_str(), theme.toggle_icon()));
            }
            Command::Buttons => {
                let labels: Vec<String> = buttons(self.session.mode())
                    .iter()
                    .map(|b| b.caption())
                    .collect();
                for row in labels.chunks(4) {
                    self.sink.line(&row.join("  "));
                }
            }
            Command::Press(id) => self.session.press(&id, &mut self.sink),
            Command::Keys(text) => {
                for c in text.chars() {
                    self.session.key(KeyboardKey::Char(c), &mut self.sink);
                }
            }
            Command::History => {
                if self.session.history().is_empty() {
                    self.sink.line("(no history)");
                }
                let lines: Vec<String> = self
                    .session
                    .history()
                    .recent(self.history_limit)
                    .enumerate()
                    .map(|(i, entry)| format!("{:>3}  {} = {}", i, entry.expression, entry.result))
                    .collect();
                for line in lines {
                    self.sink.line(&line);
                }
            }
            Command::Use(index) => {
                if self.session.use_entry(index).is_some() {
                    self.sink.show(self.session.display_text());
                } else {
                    self.sink.line(&format!("no history entry {}", index));
                }
            }
            Command::Delete(index) => {
                if !self.session.remove_entry(index) {
                    self.sink.line(&format!("no history entry {}", index));
                }
            }
            Command::ClearHistory => self.session.clear_history(),
            Command::Clear => {
                self.session.clear();
                self.sink.show(self.session.display_text());
            }
            Command::Copy => match self.session.history().get(0) {
                Some(entry) => match copy_to_clipboard(&entry.result) {
                    Ok(()) => self.sink.line(&format!("Copied {}", entry.result)),
                    Err(err) => self.sink.line(&err.to_string()),
                },
                None => self.sink.line("nothing to copy"),
            },
            Command::Help => self.sink.line(HELP),
            Command::Quit => return false,
        }
        true
    }
}
