//! Keyboard event handling with crossterm.
//!
//! Keys map to [`Action`]s depending on the mode: while typing a GUID every
//! printable character is input, otherwise single-letter commands apply.
//!
//! | Key | Browsing | Input |
//! |-----|----------|-------|
//! | `j` / Down, `k` / Up | move selection | |
//! | Enter | open selected GUID | open typed GUID |
//! | Backspace / `b` | back | delete character |
//! | `/` / `g` | type a GUID | |
//! | `f` | toggle blacklist | |
//! | `x` | blacklist selected element | |
//! | `c` | clear not-found cache entries | |
//! | Esc | dismiss error | cancel |
//! | `q` / Ctrl+C | quit | Ctrl+C quits |

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;

use super::app::{Action, AppMode};

#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to read terminal event: {0}")]
    Io(#[from] io::Error),
}

/// Polls the terminal and turns key presses into actions.
#[derive(Debug, Default)]
pub struct EventHandler;

impl EventHandler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Wait up to `timeout` for an event and resolve it for `mode`.
    ///
    /// Non-key events and unbound keys yield `Ok(None)`.
    pub fn poll(&self, timeout: Duration, mode: AppMode) -> Result<Option<Action>, EventError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(resolve(&key, mode)),
            _ => Ok(None),
        }
    }
}

/// Map a key event to an action. Key releases are ignored.
#[must_use]
pub fn resolve(key: &KeyEvent, mode: AppMode) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    match mode {
        AppMode::Input => match key.code {
            KeyCode::Enter => Some(Action::Open),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Backspace => Some(Action::InputBackspace),
            KeyCode::Char(c) => Some(Action::InputChar(c)),
            _ => None,
        },
        AppMode::Browsing => match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NavigateDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::NavigateUp),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Some(Action::Open),
            KeyCode::Backspace | KeyCode::Char('b') | KeyCode::Char('h') | KeyCode::Left => {
                Some(Action::Back)
            }
            KeyCode::Char('/') | KeyCode::Char('g') => Some(Action::StartInput),
            KeyCode::Char('f') => Some(Action::ToggleBlacklist),
            KeyCode::Char('x') => Some(Action::BlacklistSelected),
            KeyCode::Char('c') => Some(Action::ClearNotFound),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        },
        AppMode::Quitting => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_browsing_keys() {
        let mode = AppMode::Browsing;
        assert_eq!(resolve(&press(KeyCode::Char('j')), mode), Some(Action::NavigateDown));
        assert_eq!(resolve(&press(KeyCode::Up), mode), Some(Action::NavigateUp));
        assert_eq!(resolve(&press(KeyCode::Enter), mode), Some(Action::Open));
        assert_eq!(resolve(&press(KeyCode::Backspace), mode), Some(Action::Back));
        assert_eq!(resolve(&press(KeyCode::Char('/')), mode), Some(Action::StartInput));
        assert_eq!(resolve(&press(KeyCode::Char('f')), mode), Some(Action::ToggleBlacklist));
        assert_eq!(resolve(&press(KeyCode::Char('x')), mode), Some(Action::BlacklistSelected));
        assert_eq!(resolve(&press(KeyCode::Char('c')), mode), Some(Action::ClearNotFound));
        assert_eq!(resolve(&press(KeyCode::Char('q')), mode), Some(Action::Quit));
        assert_eq!(resolve(&press(KeyCode::Char('z')), mode), None);
    }

    #[test]
    fn test_input_keys() {
        let mode = AppMode::Input;
        assert_eq!(resolve(&press(KeyCode::Char('q')), mode), Some(Action::InputChar('q')));
        assert_eq!(resolve(&press(KeyCode::Char('7')), mode), Some(Action::InputChar('7')));
        assert_eq!(resolve(&press(KeyCode::Backspace), mode), Some(Action::InputBackspace));
        assert_eq!(resolve(&press(KeyCode::Enter), mode), Some(Action::Open));
        assert_eq!(resolve(&press(KeyCode::Esc), mode), Some(Action::Cancel));
    }

    #[test]
    fn test_ctrl_c_quits_in_every_mode() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(resolve(&key, AppMode::Browsing), Some(Action::Quit));
        assert_eq!(resolve(&key, AppMode::Input), Some(Action::Quit));
    }

    #[test]
    fn test_release_ignored() {
        let key = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(resolve(&key, AppMode::Browsing), None);
    }
}
