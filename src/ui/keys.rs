//! Keyboard → device button mapping.

use crate::controller::{Button, Screen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(Button),
    Quit,
}

/// Map a key press to a button. `a` and `r` are approve/reject shortcuts
/// on the confirm card only.
pub fn map_key(key: &KeyEvent, screen: &Screen<'_>) -> Option<KeyAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }

    let button = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Button::Up,
        KeyCode::Down | KeyCode::Char('j') => Button::Down,
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            Button::Select
        }
        KeyCode::Esc | KeyCode::Left | KeyCode::Backspace | KeyCode::Char('h') => Button::Back,
        KeyCode::Char('a') | KeyCode::Char('A') if matches!(screen, Screen::Confirming(_)) => {
            Button::Up
        }
        KeyCode::Char('r') | KeyCode::Char('R') if matches!(screen, Screen::Confirming(_)) => {
            Button::Down
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(KeyAction::Quit),
        _ => return None,
    };
    Some(KeyAction::Press(button))
}
