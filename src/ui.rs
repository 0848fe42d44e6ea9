//! Terminal rendering of the session: transport, progress, visualizer and
//! the playlist. Nothing here mutates playback state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Sparkline, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings, VisualizerStyle};
use crate::playback::{PlaybackSession, PlaybackState, RepeatMode};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected song");
    map.insert("space/p", "play/pause");
    map.insert("x", "stop");
    map.insert("h/l", "prev/next song");
    // H/L is filled dynamically from config.
    map.insert("up/down", "volume");
    map.insert("s", "shuffle");
    map.insert("r", "repeat");
    map.insert("v", "visualizer");
    map.insert("e", "eq preset");
    map.insert("K", "metadata");
    map.insert("R", "rescan");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating the skip interval.
pub fn controls_text(skip_seconds: i32) -> String {
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "x", "up/down", "gg/G", "s", "r", "v", "e",
        "K", "R", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] skip -/+{}s", skip_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `elapsed / total`, or just the elapsed time when the length is unknown.
pub fn progress_label(position: Duration, duration: Duration) -> String {
    if duration.is_zero() {
        format_mmss(position)
    } else {
        format!("{} / {}", format_mmss(position), format_mmss(duration))
    }
}

/// Fraction of the bar at terminal column `column`, clamped to `[0, 1]`.
pub fn fraction_at(area: Rect, column: u16) -> f64 {
    // the bordered block eats one column on each side
    let inner_x = area.x.saturating_add(1);
    let inner_w = area.width.saturating_sub(2).max(1);
    let offset = column.saturating_sub(inner_x).min(inner_w);
    f64::from(offset) / f64::from(inner_w)
}

fn repeat_text(repeat: RepeatMode) -> &'static str {
    match repeat {
        RepeatMode::Off => "REPEAT: Off",
        RepeatMode::All => "REPEAT: All",
        RepeatMode::One => "REPEAT: One",
    }
}

/// Animated levels for the visualizer, each in `[0, 1]`.
///
/// There is no audio analysis; the bars are a sine animation scaled by the
/// volume currently applied, so fades are visible.
pub fn visualizer_levels(style: VisualizerStyle, tick: u64, volume: u8) -> Vec<f64> {
    let t = tick as f64;
    let gain = f64::from(volume.min(100)) / 100.0;
    let levels: Vec<f64> = match style {
        VisualizerStyle::None => Vec::new(),
        VisualizerStyle::VuMeter => vec![
            (t * 0.08).sin().abs() * 0.7 + 0.1,
            (t * 0.10 + 1.0).sin().abs() * 0.65 + 0.15,
        ],
        VisualizerStyle::Spectrum => (0..16)
            .map(|i| (f64::from(i) * 0.5 + t * 0.1).sin().abs() * 0.8 + 0.2)
            .collect(),
        VisualizerStyle::Wave => (0..64)
            .map(|i| ((f64::from(i) * 0.3 + t * 0.2).sin() + 1.0) / 2.0)
            .collect(),
    };
    levels.into_iter().map(|l| (l * gain).clamp(0.0, 1.0)).collect()
}

fn level_color(level: f64) -> Color {
    if level < 0.7 {
        Color::Green
    } else if level < 0.85 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn draw_visualizer(frame: &mut Frame, area: Rect, app: &App, session: &PlaybackSession) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} | v cycles ", app.visualizer.label().to_uppercase()));

    let playing = matches!(
        session.state(),
        PlaybackState::Playing | PlaybackState::Fading
    );
    if app.visualizer == VisualizerStyle::None || !playing {
        let text = if playing { "▶ PLAYING" } else { "⏸ PAUSED" };
        let par = Paragraph::new(text)
            .alignment(Alignment::Center)
            .bold()
            .block(block);
        frame.render_widget(par, area);
        return;
    }

    let levels = visualizer_levels(app.visualizer, app.animation_tick, session.effective_volume());
    match app.visualizer {
        VisualizerStyle::VuMeter => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Length(1)])
                .split(inner);
            for ((row, level), label) in rows.iter().zip(&levels).zip(["L", "R"]) {
                let gauge = Gauge::default()
                    .gauge_style(Style::default().fg(level_color(*level)))
                    .ratio(*level)
                    .label(label);
                frame.render_widget(gauge, *row);
            }
        }
        _ => {
            let bars: Vec<u64> = levels.iter().map(|l| (l * 100.0).round() as u64).collect();
            let spark = Sparkline::default()
                .block(block)
                .max(100)
                .style(Style::default().fg(Color::Cyan))
                .data(bars);
            frame.render_widget(spark, area);
        }
    }
}

/// Render the entire UI into `frame`. Returns the area of the progress bar so
/// pointer input can be mapped onto it.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    session: &PlaybackSession,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing + progress
    let title = match session.current_track() {
        Some(track) => format!(" {}: {} ", session.state().label(), track.name),
        None => " no track ".to_string(),
    };
    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(session.progress().unwrap_or(0.0))
        .label(progress_label(session.position(), session.duration()));
    frame.render_widget(progress, chunks[1]);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();

        if app.follow_playback {
            parts.push("CURSOR: Follow".to_string());
        } else {
            parts.push("CURSOR: Free-roam".to_string());
        }
        parts.push(repeat_text(session.repeat()).to_string());
        parts.push(format!(
            "Shuffle: {}",
            if session.shuffle() { "ON" } else { "OFF" }
        ));
        if session.effective_volume() != session.volume() {
            parts.push(format!(
                "Vol: {}% ({}%)",
                session.volume(),
                session.effective_volume()
            ));
        } else {
            parts.push(format!("Vol: {}%", session.volume()));
        }
        if session.is_at_end() {
            parts.push("End of playlist".to_string());
        }
        if session.crossfade().is_zero() {
            parts.push("Crossfade: off".to_string());
        } else {
            parts.push(format!("Crossfade: {:.1}s", session.crossfade().as_secs_f64()));
        }
        let eq = session
            .equalizer()
            .preset()
            .map_or("Custom", |p| p.name());
        parts.push(format!("EQ: {eq}"));
        if let Some(dir) = &app.current_dir {
            parts.push(format!("Dir: {}", dir.display()));
        }

        let mut lines = vec![Line::from(parts.join(" • "))];
        if let Some(msg) = app.status() {
            let style = if msg.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };
            lines.push(Line::styled(msg.text.clone(), style));
        }
        lines
    };

    let status_par = Paragraph::new(status)
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
    frame.render_widget(status_par, chunks[2]);

    draw_visualizer(frame, chunks[3], app, session);

    // Main list
    {
        let tracks = session.playlist().tracks();
        let playing = session.current_index();

        // Keep the cursor row in the middle of the visible window.
        // Only build ListItems for the visible window.
        let total = tracks.len();
        let list_height = chunks[4].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = tracks[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let marker = if playing == Some(start + offset) { "♪ " } else { "  " };
                ListItem::new(format!("{marker}{}", track.name))
            })
            .collect();

        let list = List::new(visible_items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" tracks ({}) ", total)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[4], &mut state);
    }

    // Track info popup over the playlist
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 7, chunks[4]);
        frame.render_widget(Clear, popup_area);

        let meta = match session.playlist().get(app.selected) {
            Some(track) => format!(
                "Name: {}\nDuration: {}\nPath: {}",
                track.name,
                if track.has_duration() {
                    format_mmss(track.duration)
                } else {
                    "-".to_string()
                },
                track.path.display()
            ),
            None => "No track selected".to_string(),
        };
        let meta_paragraph = Paragraph::new(meta)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" metadata (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.skip_seconds))
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
    frame.render_widget(footer, chunks[5]);

    chunks[1]
}

/// A `width` x `height` box centered in `r`, shrunk to fit.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmss_and_progress_labels() {
        assert_eq!(format_mmss(Duration::from_secs(75)), "01:15");
        assert_eq!(
            progress_label(Duration::from_secs(5), Duration::from_secs(200)),
            "00:05 / 03:20"
        );
        assert_eq!(progress_label(Duration::from_secs(5), Duration::ZERO), "00:05");
    }

    #[test]
    fn fraction_at_maps_columns_inside_the_border() {
        let area = Rect::new(10, 4, 22, 3);
        assert_eq!(fraction_at(area, 0), 0.0);
        assert_eq!(fraction_at(area, 11), 0.0);
        assert_eq!(fraction_at(area, 21), 0.5);
        assert_eq!(fraction_at(area, 31), 1.0);
        assert_eq!(fraction_at(area, 200), 1.0);
    }

    #[test]
    fn controls_text_includes_skip_interval() {
        let text = controls_text(15);
        assert!(text.contains("[H/L] skip -/+15s"));
        assert!(text.starts_with("[j/k] up/down"));
        assert!(text.ends_with("[q] quit"));
    }

    #[test]
    fn visualizer_levels_follow_style_and_volume() {
        assert!(visualizer_levels(VisualizerStyle::None, 3, 70).is_empty());
        assert_eq!(visualizer_levels(VisualizerStyle::VuMeter, 3, 70).len(), 2);
        assert_eq!(visualizer_levels(VisualizerStyle::Spectrum, 3, 70).len(), 16);
        assert!(
            visualizer_levels(VisualizerStyle::Wave, 9, 0)
                .iter()
                .all(|&l| l == 0.0)
        );
        assert!(
            visualizer_levels(VisualizerStyle::Spectrum, 9, 100)
                .iter()
                .all(|l| (0.0..=1.0).contains(l))
        );
    }
}
