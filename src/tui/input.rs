//! Input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be triggered by key events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Quit the application
    Quit,
    /// Submit the current input or selection
    Submit,
    /// Cancel current operation / close dialog
    Cancel,
    /// Insert a newline
    Newline,
    /// Move selection up
    Up,
    /// Move selection down
    Down,
    /// Move cursor left
    Left,
    /// Move cursor right
    Right,
    /// Move to start of line
    Home,
    /// Move to end of line
    End,
    /// Delete character before cursor
    Backspace,
    /// Delete character at cursor
    Delete,
    /// Insert character
    Char(char),
    /// Next route (Tab)
    NextRoute,
    /// Previous route (Shift+Tab)
    PrevRoute,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Clear input
    ClearInput,
    /// Move the selected item up in a reorderable list (Ctrl+Up)
    MoveItemUp,
    /// Move the selected item down in a reorderable list (Ctrl+Down)
    MoveItemDown,
    /// No action
    None,
}

/// Convert a key event to an action
pub fn key_to_action(key: KeyEvent) -> Action {
    // Try each category of keys in order
    check_quit_keys(&key)
        .or_else(|| check_enter_keys(&key))
        .or_else(|| check_navigation_keys(&key))
        .or_else(|| check_editing_keys(&key))
        .or_else(|| check_control_keys(&key))
        .or_else(|| check_char_keys(&key))
        .unwrap_or(Action::None)
}

/// Check for quit key combinations
fn check_quit_keys(key: &KeyEvent) -> Option<Action> {
    match key {
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        }
        | KeyEvent {
            code: KeyCode::Char('d'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => Some(Action::Quit),
        _ => None,
    }
}

/// Check for enter key combinations
fn check_enter_keys(key: &KeyEvent) -> Option<Action> {
    match key {
        // Submit (Enter)
        KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            ..
        } => Some(Action::Submit),
        // Newline (Shift+Enter, Alt+Enter)
        KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::SHIFT,
            ..
        }
        | KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::ALT,
            ..
        } => Some(Action::Newline),
        // Cancel (Escape)
        KeyEvent {
            code: KeyCode::Esc, ..
        } => Some(Action::Cancel),
        _ => None,
    }
}

/// Check for navigation keys
fn check_navigation_keys(key: &KeyEvent) -> Option<Action> {
    match key {
        KeyEvent {
            code: KeyCode::Up,
            modifiers: KeyModifiers::CONTROL,
            ..
        } => Some(Action::MoveItemUp),
        KeyEvent {
            code: KeyCode::Down,
            modifiers: KeyModifiers::CONTROL,
            ..
        } => Some(Action::MoveItemDown),
        KeyEvent {
            code: KeyCode::Up,
            modifiers: KeyModifiers::NONE,
            ..
        } => Some(Action::Up),
        KeyEvent {
            code: KeyCode::Down,
            modifiers: KeyModifiers::NONE,
            ..
        } => Some(Action::Down),
        KeyEvent {
            code: KeyCode::Left,
            modifiers: KeyModifiers::NONE,
            ..
        } => Some(Action::Left),
        KeyEvent {
            code: KeyCode::Right,
            modifiers: KeyModifiers::NONE,
            ..
        } => Some(Action::Right),
        KeyEvent {
            code: KeyCode::Home,
            ..
        } => Some(Action::Home),
        KeyEvent {
            code: KeyCode::End, ..
        } => Some(Action::End),
        KeyEvent {
            code: KeyCode::PageUp,
            ..
        } => Some(Action::PageUp),
        KeyEvent {
            code: KeyCode::PageDown,
            ..
        } => Some(Action::PageDown),
        KeyEvent {
            code: KeyCode::Tab,
            modifiers: KeyModifiers::NONE,
            ..
        } => Some(Action::NextRoute),
        KeyEvent {
            code: KeyCode::BackTab,
            ..
        } => Some(Action::PrevRoute),
        _ => None,
    }
}

/// Check for editing keys
fn check_editing_keys(key: &KeyEvent) -> Option<Action> {
    match key {
        KeyEvent {
            code: KeyCode::Backspace,
            ..
        } => Some(Action::Backspace),
        KeyEvent {
            code: KeyCode::Delete,
            ..
        } => Some(Action::Delete),
        _ => None,
    }
}

/// Check for control key combinations
fn check_control_keys(key: &KeyEvent) -> Option<Action> {
    match key {
        // Line navigation shortcuts
        KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => Some(Action::Home),
        KeyEvent {
            code: KeyCode::Char('e'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => Some(Action::End),
        // Clear input
        KeyEvent {
            code: KeyCode::Char('u'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => Some(Action::ClearInput),
        _ => None,
    }
}

/// Check for character input keys
fn check_char_keys(key: &KeyEvent) -> Option<Action> {
    match key {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
            ..
        }
        | KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::SHIFT,
            ..
        } => Some(Action::Char(*c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(key), Action::Quit);
    }

    #[test]
    fn test_plain_enter_submits_shift_enter_breaks() {
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            Action::Submit
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)),
            Action::Newline
        );
    }

    #[test]
    fn test_ctrl_arrows_reorder() {
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Up, KeyModifiers::CONTROL)),
            Action::MoveItemUp
        );
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Down, KeyModifiers::CONTROL)),
            Action::MoveItemDown
        );
    }

    #[test]
    fn test_shifted_chars_pass_through() {
        let key = KeyEvent::new(KeyCode::Char('M'), KeyModifiers::SHIFT);
        assert_eq!(key_to_action(key), Action::Char('M'));
    }
}
