//! Keyboard input dispatch: overlays → global keys → sidebar controls.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Overlay, View};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    if app.overlay == Overlay::Help {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            app.overlay = Overlay::None;
        }
        return;
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false
        }
        KeyCode::Char('?') => app.overlay = Overlay::Help,
        KeyCode::Char(c @ '1'..='3') => {
            if let Some(view) = View::from_index(c as usize - '1' as usize) {
                app.view = view;
            }
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.view = app.view.prev();
            } else {
                app.view = app.view.next();
            }
        }
        KeyCode::BackTab => app.view = app.view.prev(),
        KeyCode::Char('r') => app.refresh(),

        // 3. Sidebar controls.
        KeyCode::Char('j') | KeyCode::Down => app.focus = app.focus.next(),
        KeyCode::Char('k') | KeyCode::Up => app.focus = app.focus.prev(),
        KeyCode::Char('l') | KeyCode::Right => app.step_control(true),
        KeyCode::Char('h') | KeyCode::Left => app.step_control(false),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Control;
    use crate::test_helpers::{app_with, today};
    use crossterm::event::KeyEventState;
    use stockcast_core::DashboardConfig;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ready_app() -> AppState {
        let (mut app, _) = app_with(DashboardConfig::default());
        app.rerun_until(today());
        app
    }

    #[test]
    fn quit_on_q() {
        let mut app = ready_app();
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn number_keys_and_tab_switch_views() {
        let mut app = ready_app();
        handle_key(&mut app, press(KeyCode::Char('3')));
        assert_eq!(app.view, View::Components);
        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(app.view, View::Prices);
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.view, View::Components);
        assert!(!app.needs_rerun());
    }

    #[test]
    fn focus_and_adjust_trigger_rerun() {
        let mut app = ready_app();
        handle_key(&mut app, press(KeyCode::Char('j')));
        assert_eq!(app.focus, Control::Lookback);
        handle_key(&mut app, press(KeyCode::Char('l')));
        assert_eq!(app.selection.lookback.get(), 3);
        assert!(app.needs_rerun());
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let mut app = ready_app();
        handle_key(&mut app, press(KeyCode::Char('?')));
        assert_eq!(app.overlay, Overlay::Help);

        handle_key(&mut app, press(KeyCode::Char('2')));
        assert_eq!(app.view, View::Prices);

        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
        assert!(app.running);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = ready_app();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key(&mut app, release);
        assert!(app.running);
    }

    #[test]
    fn refresh_marks_rerun() {
        let mut app = ready_app();
        handle_key(&mut app, press(KeyCode::Char('r')));
        assert!(app.needs_rerun());
        assert!(!app.loader.is_cached("NVDA"));
    }
}
