//! Key bindings: normal and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Select,
    ClearSelection,
    Pause,
    Reset,
    SwitchLanguage,
    Bomb,
    Replace,
    Monster,
    Hint,
    Faster,
    Slower,
    Quit,
    None,
}

/// Map key event to game action. Supports both normal (arrows, space) and vim (hjkl).
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod && modifiers != KeyModifiers::CONTROL {
        return Action::None;
    }
    match code {
        KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
        KeyCode::Char('p') | KeyCode::Char(' ') if modifiers == KeyModifiers::CONTROL => Action::Pause,
        _ if !no_mod => Action::None,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Backspace | KeyCode::Char('c') => Action::ClearSelection,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('L') => Action::SwitchLanguage,
        KeyCode::Char('b') => Action::Bomb,
        KeyCode::Char('x') => Action::Replace,
        KeyCode::Char('m') => Action::Monster,
        KeyCode::Char('?') => Action::Hint,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Faster,
        KeyCode::Char('-') | KeyCode::Char('_') => Action::Slower,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Action {
        key_to_action(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_vim_and_arrow_keys_agree() {
        assert_eq!(press(KeyCode::Char('h'), KeyModifiers::NONE), Action::MoveLeft);
        assert_eq!(press(KeyCode::Left, KeyModifiers::NONE), Action::MoveLeft);
        assert_eq!(press(KeyCode::Char('l'), KeyModifiers::NONE), Action::MoveRight);
        assert_eq!(press(KeyCode::Char('j'), KeyModifiers::NONE), Action::MoveDown);
    }

    #[test]
    fn test_shifted_l_switches_language() {
        assert_eq!(press(KeyCode::Char('L'), KeyModifiers::SHIFT), Action::SwitchLanguage);
        assert_eq!(press(KeyCode::Tab, KeyModifiers::NONE), Action::SwitchLanguage);
        assert_eq!(press(KeyCode::Char('?'), KeyModifiers::SHIFT), Action::Hint);
    }

    #[test]
    fn test_control_chords() {
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::NONE), Action::ClearSelection);
        assert_eq!(press(KeyCode::Char('b'), KeyModifiers::CONTROL), Action::None);
        assert_eq!(press(KeyCode::Char('b'), KeyModifiers::ALT), Action::None);
    }
}
