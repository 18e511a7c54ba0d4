use crate::app::InputMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextFocus,
    PrevFocus,
    Down,
    Up,
    PageDown,
    PageUp,
    Top,
    Bottom,
    OpenSelected,
    CloseDetail,
    Refresh,
    OpenNamespacePicker,
    StartSearch,
    StartCommand,
    ToggleHelp,
    NextField,
    PrevField,
    ToggleKind,
    SubmitInput,
    CancelInput,
    Backspace,
    InputChar(char),
}

pub fn map_key(mode: InputMode, key: KeyEvent) -> Option<Action> {
    match mode {
        InputMode::Normal => map_normal_mode_key(key),
        InputMode::NamespacePicker => map_picker_key(key),
        InputMode::Search => map_search_key(key),
        InputMode::Command => map_command_key(key),
    }
}

fn map_normal_mode_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('j') if key.modifiers.is_empty() => Some(Action::Down),
        KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') if key.modifiers.is_empty() => Some(Action::Up),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Action::Bottom),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::PageDown)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::PageUp),
        KeyCode::BackTab => Some(Action::PrevFocus),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(Action::PrevFocus),
        KeyCode::Tab => Some(Action::NextFocus),
        KeyCode::Enter => Some(Action::OpenSelected),
        KeyCode::Char('m') | KeyCode::Char('j')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Action::OpenSelected)
        }
        KeyCode::Esc => Some(Action::CloseDetail),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('n') if key.modifiers.is_empty() => Some(Action::OpenNamespacePicker),
        KeyCode::Char('/') => Some(Action::StartSearch),
        KeyCode::Char(':') => Some(Action::StartCommand),
        KeyCode::Char(';') if key.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(Action::StartCommand)
        }
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        _ => None,
    }
}

fn map_picker_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::CancelInput),
        KeyCode::Enter => Some(Action::SubmitInput),
        KeyCode::Char('j') if key.modifiers.is_empty() => Some(Action::Down),
        KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') if key.modifiers.is_empty() => Some(Action::Up),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Char('g') | KeyCode::Home => Some(Action::Top),
        KeyCode::Char('G') | KeyCode::End => Some(Action::Bottom),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        _ => None,
    }
}

fn map_search_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::BackTab => Some(Action::PrevField),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(Action::PrevField),
        KeyCode::Tab => Some(Action::NextField),
        KeyCode::Left | KeyCode::Right => Some(Action::ToggleKind),
        _ => map_text_input_key(key),
    }
}

fn map_command_key(key: KeyEvent) -> Option<Action> {
    map_text_input_key(key)
}

fn map_text_input_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::CancelInput),
        KeyCode::Enter => Some(Action::SubmitInput),
        KeyCode::Char('m') | KeyCode::Char('j')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Action::SubmitInput)
        }
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            Some(Action::InputChar(c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, map_key};
    use crate::app::InputMode;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn normal_mode_maps_quit() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        let action = map_key(InputMode::Normal, key);
        assert_eq!(action, Some(Action::Quit));
    }

    #[test]
    fn normal_mode_maps_refresh_keys() {
        for code in [KeyCode::Char('r'), KeyCode::F(5)] {
            let key = KeyEvent::new(code, KeyModifiers::NONE);
            assert_eq!(map_key(InputMode::Normal, key), Some(Action::Refresh));
        }
    }

    #[test]
    fn normal_mode_maps_tab_and_backtab_to_focus_cycle() {
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let back = KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Normal, tab), Some(Action::NextFocus));
        assert_eq!(map_key(InputMode::Normal, back), Some(Action::PrevFocus));
    }

    #[test]
    fn normal_mode_maps_mode_entry_keys() {
        let cases = [
            ('n', Action::OpenNamespacePicker),
            ('/', Action::StartSearch),
            (':', Action::StartCommand),
            ('?', Action::ToggleHelp),
        ];
        for (c, expected) in cases {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            assert_eq!(map_key(InputMode::Normal, key), Some(expected));
        }
    }

    #[test]
    fn normal_mode_maps_shift_semicolon_to_command() {
        let key = KeyEvent::new(KeyCode::Char(';'), KeyModifiers::SHIFT);
        assert_eq!(map_key(InputMode::Normal, key), Some(Action::StartCommand));
    }

    #[test]
    fn normal_mode_maps_enter_and_esc_to_detail_actions() {
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Normal, enter), Some(Action::OpenSelected));
        assert_eq!(map_key(InputMode::Normal, esc), Some(Action::CloseDetail));
    }

    #[test]
    fn picker_treats_letters_as_navigation() {
        let j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::NamespacePicker, j), Some(Action::Down));
        assert_eq!(map_key(InputMode::NamespacePicker, q), Some(Action::CancelInput));
    }

    #[test]
    fn search_mode_maps_tab_arrows_and_chars() {
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let left = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Search, tab), Some(Action::NextField));
        assert_eq!(map_key(InputMode::Search, left), Some(Action::ToggleKind));
        assert_eq!(map_key(InputMode::Search, space), Some(Action::InputChar(' ')));
        assert_eq!(map_key(InputMode::Search, q), Some(Action::InputChar('q')));
    }

    #[test]
    fn command_mode_maps_char() {
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        let action = map_key(InputMode::Command, key);
        assert_eq!(action, Some(Action::InputChar('a')));
    }

    #[test]
    fn command_mode_rejects_ctrl_c() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(InputMode::Command, key), None);
    }

    #[test]
    fn input_modes_map_ctrl_m_and_ctrl_j_to_submit() {
        for c in ['m', 'j'] {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
            assert_eq!(map_key(InputMode::Command, key), Some(Action::SubmitInput));
            assert_eq!(map_key(InputMode::Search, key), Some(Action::SubmitInput));
        }
    }
}
