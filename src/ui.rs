//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::App;
use crate::config::UiSettings;
use crate::controller::{PlaybackSession, PlayerState};
use crate::library::Track;
use crate::playlist::Playlist;

const CONTROLS: [(&str, &str); 12] = [
    ("j/k", "up/down"),
    ("h/l", "prev/next song"),
    ("enter", "play selected song"),
    ("space/p", "play/pause"),
    ("s", "stop"),
    ("gg/G", "top/bottom"),
    ("x", "toggle track"),
    ("a", "select all"),
    ("A", "select none"),
    ("S", "sort"),
    ("o", "open folder"),
    ("q", "quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn state_label(state: PlayerState) -> &'static str {
    match state {
        PlayerState::Idle => "Idle",
        PlayerState::Stopped => "Stopped",
        PlayerState::Loading => "Loading",
        PlayerState::Playing => "Playing",
        PlayerState::Paused => "Paused",
        PlayerState::Exhausted => "Nothing left to play",
    }
}

/// One list row: checkbox, name and optional duration.
fn row_text(track: &Track, playing: bool, show_durations: bool) -> String {
    let mark = if track.selected { "[x]" } else { "[ ]" };
    let now = if playing { "♪ " } else { "" };
    match track.duration {
        Some(d) if show_durations => format!("{mark} {now}{} ({})", track.display, format_mmss(d)),
        _ => format!("{mark} {now}{}", track.display),
    }
}

fn status_text(app: &App, playlist: &Playlist, session: &PlaybackSession) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(format!(" {}", state_label(session.state)));

    if let Some(track) = session.current_index.and_then(|i| playlist.get(i)) {
        let time = match track.duration {
            Some(total) => format!("{}/{}", format_mmss(session.elapsed), format_mmss(total)),
            None => format_mmss(session.elapsed),
        };
        parts.push(format!("Song: {} [{}]", track.display, time));
    }

    parts.push(format!(
        "Selected: {}/{}",
        playlist.selected_count(),
        playlist.len()
    ));

    if let Some(key) = app.sort_key {
        parts.push(format!("Sort: {}", key.label()));
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir.display()));
    }

    if let Some(msg) = &app.status {
        parts.push(msg.clone());
    }

    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    playlist: &Playlist,
    session: &PlaybackSession,
    ui_settings: &UiSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" folio ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, playlist, session))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    let status_par = if session.is_loading {
        status_par.slow_blink()
    } else {
        status_par
    };
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        // Center the cursor when possible; only the visible window is built.
        let total = playlist.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let cursor = app.cursor.min(total.saturating_sub(1));
        let (start, end, cursor_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, cursor)
        } else {
            let half = list_height / 2;
            let mut start = cursor.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, cursor - start)
        };

        let visible_items: Vec<ListItem> = playlist.tracks()[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let playing = session.current_index == Some(start + offset)
                    && (session.is_playing
                        || session.is_loading
                        || session.state == PlayerState::Paused);
                let item = ListItem::new(row_text(track, playing, ui_settings.show_durations));
                if track.selected {
                    item
                } else {
                    item.style(Style::default().add_modifier(Modifier::DIM))
                }
            })
            .collect();

        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(cursor_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    if let Some(input) = &app.prompt {
        let popup_area = centered_rect_sized(72, 3, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let prompt = Paragraph::new(format!("{input}_")).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" open folder (enter confirms, esc cancels) "),
        );
        frame.render_widget(prompt, popup_area);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}
