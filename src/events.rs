//! Keyboard input handling for the three-pane interface.
//!
//! Converts raw `crossterm` key events into [`crate::logic`] transitions.
//! Everything here is synchronous; requested I/O comes back to the runtime
//! as an [`Effect`] for interpretation on background tasks.

use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::ListState;

use crate::logic::{self, Effect};
use crate::state::{AppState, Focus, Modal};

/// What the runtime should do after an input event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// Keep running; nothing further to do.
    Continue,
    /// Exit the application.
    Quit,
    /// Perform the requested I/O.
    Run(Effect),
}

/// Dispatch a single input event against the application state.
pub fn handle_event(ev: CEvent, app: &mut AppState, index_names: &[String]) -> EventOutcome {
    let CEvent::Key(key) = ev else {
        return EventOutcome::Continue;
    };
    if key.kind != KeyEventKind::Press {
        return EventOutcome::Continue;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return EventOutcome::Quit;
    }

    // A visible modal swallows all input until dismissed.
    if !matches!(app.modal, Modal::None) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            logic::dismiss_modal(app);
        }
        return EventOutcome::Continue;
    }

    match key.code {
        KeyCode::Esc => return EventOutcome::Quit,
        KeyCode::Tab => {
            app.focus = next_focus(app.focus);
            return EventOutcome::Continue;
        }
        KeyCode::BackTab => {
            app.focus = prev_focus(app.focus);
            return EventOutcome::Continue;
        }
        _ => {}
    }

    match app.focus {
        Focus::Search => handle_search_key(key, app, index_names),
        Focus::Installed => handle_installed_key(key, app),
        Focus::Results => handle_results_key(key, app),
    }
}

const fn next_focus(focus: Focus) -> Focus {
    match focus {
        Focus::Search => Focus::Installed,
        Focus::Installed => Focus::Results,
        Focus::Results => Focus::Search,
    }
}

const fn prev_focus(focus: Focus) -> Focus {
    match focus {
        Focus::Search => Focus::Results,
        Focus::Installed => Focus::Search,
        Focus::Results => Focus::Installed,
    }
}

fn handle_search_key(key: KeyEvent, app: &mut AppState, index_names: &[String]) -> EventOutcome {
    match key.code {
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => {
            if logic::submit_search(app, index_names) {
                app.focus = Focus::Results;
            }
        }
        _ => {}
    }
    EventOutcome::Continue
}

fn handle_installed_key(key: KeyEvent, app: &mut AppState) -> EventOutcome {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_selection(&mut app.installed_state, app.installed.len(), -1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_selection(&mut app.installed_state, app.installed.len(), 1);
        }
        KeyCode::Enter => {
            if let Some(row) = app.installed_state.selected() {
                return EventOutcome::Run(logic::select_installed(app, row));
            }
        }
        _ => return handle_action_key(key, app),
    }
    EventOutcome::Continue
}

fn handle_results_key(key: KeyEvent, app: &mut AppState) -> EventOutcome {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_selection(&mut app.results_state, app.results.len(), -1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_selection(&mut app.results_state, app.results.len(), 1);
        }
        KeyCode::Enter => {
            if let Some(row) = app.results_state.selected() {
                return EventOutcome::Run(logic::select_result(app, row));
            }
        }
        _ => return handle_action_key(key, app),
    }
    EventOutcome::Continue
}

/// Action keys are live in the list panes only, so they never collide with
/// typing in the search bar.
fn handle_action_key(key: KeyEvent, app: &mut AppState) -> EventOutcome {
    let effect = match key.code {
        KeyCode::Char('i') => logic::request_install(app),
        KeyCode::Char('u') => logic::request_uninstall(app),
        KeyCode::Char('U') => logic::request_upgrade(app),
        KeyCode::Char('P') => logic::request_upgrade_pip(app),
        _ => Effect::None,
    };
    match effect {
        Effect::None => EventOutcome::Continue,
        other => EventOutcome::Run(other),
    }
}

fn move_selection(state: &mut ListState, len: usize, delta: i64) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as i64;
    let next = (current + delta).clamp(0, len as i64 - 1) as usize;
    state.select(Some(next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActionKeys, InstalledPackage, PendingAction};
    use crossterm::event::{KeyEvent, KeyEventState};

    fn press(code: KeyCode) -> CEvent {
        CEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    /// What: Tab cycles focus through the three panes
    ///
    /// - Input: Three Tab presses from the default focus
    /// - Output: Search -> Installed -> Results -> Search
    #[test]
    fn tab_cycles_focus() {
        let mut app = AppState::default();
        for expected in [Focus::Installed, Focus::Results, Focus::Search] {
            let out = handle_event(press(KeyCode::Tab), &mut app, &[]);
            assert_eq!(out, EventOutcome::Continue);
            assert_eq!(app.focus, expected);
        }
    }

    /// What: Enter on an empty search box changes nothing
    ///
    /// - Input: Empty input, Enter in the search bar
    /// - Output: No effect, focus stays on the search bar, results untouched
    #[test]
    fn enter_on_empty_search_is_a_no_op() {
        let mut app = AppState {
            results: vec!["stale".to_string()],
            ..Default::default()
        };
        let out = handle_event(press(KeyCode::Enter), &mut app, &["fresh".to_string()]);
        assert_eq!(out, EventOutcome::Continue);
        assert_eq!(app.focus, Focus::Search);
        assert_eq!(app.results, vec!["stale".to_string()]);
    }

    /// What: Typing and submitting a search fills the results pane
    ///
    /// - Input: "ri" typed, Enter pressed
    /// - Output: Matching names ranked into results, focus moves there
    #[test]
    fn search_submit_ranks_into_results() {
        let mut app = AppState::default();
        let names = vec!["rich".to_string(), "ring".to_string(), "numpy".to_string()];
        handle_event(press(KeyCode::Char('r')), &mut app, &names);
        handle_event(press(KeyCode::Char('i')), &mut app, &names);
        let out = handle_event(press(KeyCode::Enter), &mut app, &names);
        assert_eq!(out, EventOutcome::Continue);
        assert_eq!(app.focus, Focus::Results);
        assert_eq!(app.results, vec!["rich".to_string(), "ring".to_string()]);
        assert_eq!(app.results_state.selected(), Some(0));
    }

    /// What: Enter on an installed row emits the detail fetch
    ///
    /// - Input: Installed pane focused, row highlighted, Enter pressed
    /// - Output: `FetchInstalledDetail` effect and armed keys
    #[test]
    fn enter_on_installed_row_requests_detail() {
        let mut app = AppState {
            focus: Focus::Installed,
            installed: vec![InstalledPackage {
                name: "requests".into(),
                version: "2.28.1".into(),
            }],
            ..Default::default()
        };
        app.installed_state.select(Some(0));
        let out = handle_event(press(KeyCode::Enter), &mut app, &[]);
        assert_eq!(
            out,
            EventOutcome::Run(Effect::FetchInstalledDetail("requests".into()))
        );
        assert_eq!(app.keys, ActionKeys::installed());
    }

    /// What: Disabled action keys produce no effect
    ///
    /// - Input: 'i' with install disabled; 'u' while busy
    /// - Output: `Continue` both times
    #[test]
    fn disabled_or_busy_action_keys_do_nothing() {
        let mut app = AppState {
            focus: Focus::Installed,
            selection: Some("requests".to_string()),
            keys: ActionKeys::installed(),
            ..Default::default()
        };
        assert_eq!(
            handle_event(press(KeyCode::Char('i')), &mut app, &[]),
            EventOutcome::Continue
        );

        app.busy = Some(PendingAction::Upgrade("requests".into()));
        assert_eq!(
            handle_event(press(KeyCode::Char('u')), &mut app, &[]),
            EventOutcome::Continue
        );
    }

    /// What: A modal swallows input until dismissed
    ///
    /// - Input: Alert modal, then 'j', then Enter
    /// - Output: 'j' ignored; Enter clears the modal
    #[test]
    fn modal_swallows_input_until_dismissed() {
        let mut app = AppState {
            focus: Focus::Installed,
            modal: Modal::Alert {
                title: "Error".into(),
                message: "nope".into(),
            },
            installed: vec![InstalledPackage {
                name: "requests".into(),
                version: "2.28.1".into(),
            }],
            ..Default::default()
        };
        handle_event(press(KeyCode::Char('j')), &mut app, &[]);
        assert_eq!(app.installed_state.selected(), None);
        handle_event(press(KeyCode::Enter), &mut app, &[]);
        assert_eq!(app.modal, Modal::None);
    }
}
