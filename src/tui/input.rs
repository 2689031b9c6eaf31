// Key routing
//
// Maps raw key events to shell actions. Routing depends on which surface has
// the keyboard (composer, settings pane, registration form) and on the
// configured submit key. Pure: no state is touched here.

use crate::model::SubmitKey;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Surface that currently receives typed keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Composer,
    Settings,
    RegisterForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NewSession,
    DeleteActiveSession,
    SelectPrev,
    SelectNext,
    MoveSessionUp,
    MoveSessionDown,
    ToggleSidebar,
    ToggleSettings,
    CycleTheme,
    ClearConversation,
    ResetFaults,
    CloseOverlay,

    // Composer
    Submit,
    Newline,
    Insert(char),
    Backspace,

    // Settings pane
    SettingsUp,
    SettingsDown,
    SettingsActivate,
    SettingsAdjust(i8),

    // Registration form
    FormNext,
    FormPrev,
    FormInsert(char),
    FormBackspace,
    FormSubmit,
    FormSendCode,
}

/// Route a key event; `None` for keys with no binding
pub fn route_key(key: KeyEvent, mode: InputMode, submit_key: SubmitKey) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    if let Some(action) = global_action(&key) {
        return Some(action);
    }

    match mode {
        InputMode::Composer => composer_action(&key, submit_key),
        InputMode::Settings => settings_action(&key),
        InputMode::RegisterForm => form_action(&key),
    }
}

/// Bindings that work on every surface
fn global_action(key: &KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => Some(Action::Quit),
        KeyCode::Char('n') if ctrl => Some(Action::NewSession),
        KeyCode::Char('w') if ctrl => Some(Action::DeleteActiveSession),
        KeyCode::Char('b') if ctrl => Some(Action::ToggleSidebar),
        KeyCode::Char('o') if ctrl => Some(Action::ToggleSettings),
        KeyCode::Char('t') if ctrl => Some(Action::CycleTheme),
        KeyCode::Char('l') if ctrl => Some(Action::ClearConversation),
        KeyCode::F(2) => Some(Action::ToggleSettings),
        KeyCode::F(5) => Some(Action::ResetFaults),
        KeyCode::Up if alt && shift => Some(Action::MoveSessionUp),
        KeyCode::Down if alt && shift => Some(Action::MoveSessionDown),
        KeyCode::Up if ctrl || alt => Some(Action::SelectPrev),
        KeyCode::Down if ctrl || alt => Some(Action::SelectNext),
        KeyCode::Esc => Some(Action::CloseOverlay),
        _ => None,
    }
}

fn composer_action(key: &KeyEvent, submit_key: SubmitKey) -> Option<Action> {
    match key.code {
        KeyCode::Enter => {
            if is_submit_chord(key.modifiers, submit_key) {
                Some(Action::Submit)
            } else {
                Some(Action::Newline)
            }
        }
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Tab => Some(Action::Insert('\t')),
        KeyCode::Char(c) if !has_command_modifier(key.modifiers) => Some(Action::Insert(c)),
        _ => None,
    }
}

fn settings_action(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::SettingsUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::SettingsDown),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Action::SettingsActivate),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::SettingsAdjust(-1)),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::SettingsAdjust(1)),
        _ => None,
    }
}

fn form_action(key: &KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Tab | KeyCode::Down => Some(Action::FormNext),
        KeyCode::BackTab | KeyCode::Up => Some(Action::FormPrev),
        KeyCode::Enter => Some(Action::FormSubmit),
        KeyCode::Backspace => Some(Action::FormBackspace),
        KeyCode::Char('s') if ctrl => Some(Action::FormSendCode),
        KeyCode::Char(c) if !has_command_modifier(key.modifiers) => Some(Action::FormInsert(c)),
        _ => None,
    }
}

/// Whether Enter with `modifiers` is the configured submit chord
pub fn is_submit_chord(modifiers: KeyModifiers, submit_key: SubmitKey) -> bool {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let alt = modifiers.contains(KeyModifiers::ALT);
    match submit_key {
        SubmitKey::Enter => !ctrl && !shift && !alt,
        SubmitKey::CtrlEnter => ctrl,
        SubmitKey::ShiftEnter => shift,
        SubmitKey::AltEnter => alt,
    }
}

fn has_command_modifier(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn submit_follows_configured_chord() {
        let plain = key(KeyCode::Enter, KeyModifiers::NONE);
        let ctrl = key(KeyCode::Enter, KeyModifiers::CONTROL);
        let shift = key(KeyCode::Enter, KeyModifiers::SHIFT);

        assert_eq!(
            route_key(plain, InputMode::Composer, SubmitKey::CtrlEnter),
            Some(Action::Newline)
        );
        assert_eq!(
            route_key(ctrl, InputMode::Composer, SubmitKey::CtrlEnter),
            Some(Action::Submit)
        );
        assert_eq!(
            route_key(plain, InputMode::Composer, SubmitKey::Enter),
            Some(Action::Submit)
        );
        assert_eq!(
            route_key(shift, InputMode::Composer, SubmitKey::Enter),
            Some(Action::Newline)
        );
        assert_eq!(
            route_key(shift, InputMode::Composer, SubmitKey::ShiftEnter),
            Some(Action::Submit)
        );
    }

    #[test]
    fn globals_win_over_surface_bindings() {
        let ctrl_n = key(KeyCode::Char('n'), KeyModifiers::CONTROL);
        for mode in [InputMode::Composer, InputMode::Settings, InputMode::RegisterForm] {
            assert_eq!(
                route_key(ctrl_n, mode, SubmitKey::default()),
                Some(Action::NewSession)
            );
        }
    }

    #[test]
    fn typed_text_goes_to_the_focused_surface() {
        let a = key(KeyCode::Char('a'), KeyModifiers::NONE);
        let upper = key(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(
            route_key(a, InputMode::Composer, SubmitKey::default()),
            Some(Action::Insert('a'))
        );
        assert_eq!(
            route_key(upper, InputMode::Composer, SubmitKey::default()),
            Some(Action::Insert('A'))
        );
        assert_eq!(
            route_key(a, InputMode::RegisterForm, SubmitKey::default()),
            Some(Action::FormInsert('a'))
        );
        assert_eq!(route_key(a, InputMode::Settings, SubmitKey::default()), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut release = key(KeyCode::Char('n'), KeyModifiers::CONTROL);
        release.kind = KeyEventKind::Release;
        assert_eq!(
            route_key(release, InputMode::Composer, SubmitKey::default()),
            None
        );
    }

    #[test]
    fn settings_navigation() {
        let right = key(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(
            route_key(right, InputMode::Settings, SubmitKey::default()),
            Some(Action::SettingsAdjust(1))
        );
        let alt_up = key(KeyCode::Up, KeyModifiers::ALT);
        assert_eq!(
            route_key(alt_up, InputMode::Settings, SubmitKey::default()),
            Some(Action::SelectPrev)
        );
        let move_down = key(KeyCode::Down, KeyModifiers::ALT | KeyModifiers::SHIFT);
        assert_eq!(
            route_key(move_down, InputMode::Composer, SubmitKey::default()),
            Some(Action::MoveSessionDown)
        );
    }
}
