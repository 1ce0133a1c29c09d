use crossterm::event::{KeyCode, KeyEvent};

use crate::ui::{App, View};

/// Side effects the runtime must perform after a key press; everything else
/// is applied to `App` directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SubmitLogin,
    /// Re-issue the feed query (view switch or range change): the old
    /// subscription is torn down and a new one opened.
    Resubscribe,
    Logout,
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match app.view {
        View::Login => handle_login_key(app, key),
        View::Diaries => handle_diaries_key(app, key),
        View::Dashboard => handle_dashboard_key(app, key),
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char(c) => app.login.insert_char(c),
        KeyCode::Backspace => app.login.backspace(),
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => app.login.toggle_focus(),
        KeyCode::Enter => {
            if !app.login.busy {
                return Some(Action::SubmitLogin);
            }
        }
        _ => {}
    }
    None
}

fn handle_diaries_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('m') => app.cycle_mood_filter(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('2') | KeyCode::Tab => {
            app.switch_view(View::Dashboard);
            return Some(Action::Resubscribe);
        }
        KeyCode::Char('o') => return Some(Action::Logout),
        _ => {}
    }
    None
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('r') => {
            app.cycle_range();
            return Some(Action::Resubscribe);
        }
        KeyCode::Char('1') | KeyCode::Tab => {
            app.switch_view(View::Diaries);
            return Some(Action::Resubscribe);
        }
        KeyCode::Char('o') => return Some(Action::Logout),
        _ => {}
    }
    None
}
