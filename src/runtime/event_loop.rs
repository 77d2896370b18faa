use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, PromptResult};
use crate::backend::MediaBackend;
use crate::config;
use crate::controller::Controller;
use crate::library::Probe;
use crate::store::PreferenceStore;
use crate::ui;

use super::startup::load_folder;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: drains backend events, draws, and handles
/// input. Returns `Ok(())` when shutdown is requested.
pub fn run<B: MediaBackend, S: PreferenceStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller<B, S>,
    probe: &dyn Probe,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        controller.pump(Instant::now());

        let session = controller.snapshot();
        app.follow(session.current_index);
        app.clamp(controller.playlist().len());

        terminal.draw(|f| ui::draw(f, app, controller.playlist(), &session, &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller, probe, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one key press. Returns true when the user asked to quit.
pub fn handle_key_event<B: MediaBackend, S: PreferenceStore>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut Controller<B, S>,
    probe: &dyn Probe,
    state: &mut EventLoopState,
) -> bool {
    if app.is_prompting() {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.cancel_prompt(),
            KeyCode::Backspace => app.pop_prompt_char(),
            KeyCode::Enter => {
                if let PromptResult::Folder(dir) = app.submit_prompt() {
                    load_folder(controller, app, &dir, settings, probe);
                }
            }
            KeyCode::Char(c) if !c.is_control() => app.push_prompt_char(c),
            _ => {}
        }
        return false;
    }

    let len = controller.playlist().len();
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback = false;
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback = false;
            app.last(len);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback = false;
            app.next(len);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback = false;
            app.prev(len);
        }
        KeyCode::Enter => {
            if len > 0 {
                app.follow_playback = true;
                controller.play(Some(app.cursor));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.follow_playback = true;
            controller.resume_or_play();
        }
        KeyCode::Char('l') => {
            app.follow_playback = true;
            controller.next();
        }
        KeyCode::Char('h') => {
            app.follow_playback = true;
            controller.previous();
        }
        KeyCode::Char('s') => controller.stop(),
        KeyCode::Char('x') => controller.toggle_selected(app.cursor),
        KeyCode::Char('a') => controller.select_all(),
        KeyCode::Char('A') => controller.deselect_all(),
        KeyCode::Char('S') => {
            let under_cursor = controller.playlist().get(app.cursor).map(|t| t.path.clone());
            let key = app.cycle_sort();
            controller.sort(key);
            if let Some(i) = under_cursor.and_then(|p| controller.playlist().position_of(&p)) {
                app.cursor = i;
            }
            app.set_status(format!("Sorted by {}", key.label()));
        }
        KeyCode::Char('o') => app.open_prompt(),
        _ => {}
    }

    false
}
