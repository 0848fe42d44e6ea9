use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

use crate::app::App;
use crate::config::{self, ControlsSettings};
use crate::error::Result;
use crate::playback::{ControlEvent, PlaybackSession, Preset};
use crate::runtime::startup;
use crate::scheduler::{Scheduler, Task};
use crate::ui;

/// A user intent decoded from a key or pointer event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePlay,
    Stop,
    Next,
    Previous,
    Skip(i32),
    Volume(i16),
    CycleRepeat,
    ToggleShuffle,
    CycleVisualizer,
    CycleEqPreset,
    CursorDown,
    CursorUp,
    CursorTop,
    CursorBottom,
    PlaySelected,
    ToggleMetadata,
    Rescan,
}

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Where the progress bar was last drawn, for pointer seeking.
    progress_area: Rect,
    scheduler: Scheduler,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings) -> Self {
        let now = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.every(Task::Poll, Duration::from_millis(settings.ui.progress_poll_ms), now);
        scheduler.every(Task::EndCheck, Duration::from_millis(settings.ui.end_check_ms), now);
        scheduler.every(Task::Frame, Duration::from_millis(settings.ui.frame_ms), now);
        Self {
            pending_gg: false,
            progress_area: Rect::default(),
            scheduler,
        }
    }
}

/// Main terminal event loop: applies engine and crossfade events, runs the
/// periodic tasks and handles input. Returns `Ok(())` when shutdown is
/// requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut PlaybackSession,
    events: &mpsc::Receiver<ControlEvent>,
    state: &mut EventLoopState,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    terminal.draw(|f| {
        state.progress_area = ui::draw(f, app, session, &settings.ui, &settings.controls)
    })?;

    loop {
        while let Ok(ev) = events.try_recv() {
            if let Err(e) = session.handle_event(ev) {
                warn!(error = %e, "transition failed");
                app.report(&e);
            }
            app.follow(session.current_index());
        }

        let now = Instant::now();
        while let Some(task) = state.scheduler.pop_due(now) {
            match task {
                Task::Poll => {
                    if session.poll() {
                        session.start_crossfade();
                    }
                }
                Task::EndCheck => session.tick_engine(),
                Task::Frame => {
                    app.advance_animation();
                    terminal.draw(|f| {
                        state.progress_area =
                            ui::draw(f, app, session, &settings.ui, &settings.controls)
                    })?;
                }
            }
        }

        let timeout = state.scheduler.next_timeout(Instant::now());
        if !event::poll(timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let Some(cmd) = command_for_key(key, &settings.controls, &mut state.pending_gg)
                else {
                    continue;
                };
                debug!(?cmd, "key command");
                if apply_command(cmd, settings, app, session) {
                    break;
                }
            }
            Event::Mouse(mouse) => {
                if let Err(e) = handle_mouse(mouse, session, state.progress_area) {
                    app.report(&e);
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Decode a key press. `pending_gg` carries the first `g` of `gg`.
pub fn command_for_key(
    key: KeyEvent,
    controls: &ControlsSettings,
    pending_gg: &mut bool,
) -> Option<Command> {
    if key.code == KeyCode::Char('g') && key.modifiers.is_empty() {
        let was_pending = std::mem::replace(pending_gg, !*pending_gg);
        return was_pending.then_some(Command::CursorTop);
    }
    *pending_gg = false;

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return (key.code == KeyCode::Char('c')).then_some(Command::Quit);
    }

    let skip = controls.skip_seconds;
    let step = controls.volume_step;
    let cmd = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        KeyCode::Char(' ') | KeyCode::Char('p') => Command::TogglePlay,
        KeyCode::Char('x') => Command::Stop,
        KeyCode::Char('l') | KeyCode::Right => Command::Next,
        KeyCode::Char('h') | KeyCode::Left => Command::Previous,
        KeyCode::Char('L') | KeyCode::Char('+') | KeyCode::Char('=') => Command::Skip(skip),
        KeyCode::Char('H') | KeyCode::Char('-') => Command::Skip(-skip),
        KeyCode::Up => Command::Volume(step),
        KeyCode::Down => Command::Volume(-step),
        KeyCode::Char('j') => Command::CursorDown,
        KeyCode::Char('k') => Command::CursorUp,
        KeyCode::Char('G') => Command::CursorBottom,
        KeyCode::Enter => Command::PlaySelected,
        KeyCode::Char('s') => Command::ToggleShuffle,
        KeyCode::Char('r') => Command::CycleRepeat,
        KeyCode::Char('v') | KeyCode::Char('V') => Command::CycleVisualizer,
        KeyCode::Char('e') => Command::CycleEqPreset,
        KeyCode::Char('K') => Command::ToggleMetadata,
        KeyCode::Char('R') => Command::Rescan,
        _ => return None,
    };
    Some(cmd)
}

/// Carry out `cmd`. Failures go to the status line. Returns `true` on quit.
pub fn apply_command(
    cmd: Command,
    settings: &config::Settings,
    app: &mut App,
    session: &mut PlaybackSession,
) -> bool {
    let len = session.playlist().len();
    let result: Result<()> = match cmd {
        Command::Quit => {
            session.stop();
            return true;
        }
        Command::TogglePlay => {
            app.follow_playback_on();
            let r = session.toggle_play();
            // a pause that interrupted a fade leaves the volume ramped down
            session.restore_volume();
            r
        }
        Command::Stop => {
            session.stop();
            session.restore_volume();
            Ok(())
        }
        Command::Next => {
            app.follow_playback_on();
            session.next()
        }
        Command::Previous => {
            app.follow_playback_on();
            session.previous()
        }
        Command::Skip(secs) => session.skip(secs).map(|_| ()),
        Command::Volume(delta) => {
            session.adjust_volume(delta);
            Ok(())
        }
        Command::CycleRepeat => {
            let repeat = session.cycle_repeat();
            app.set_status(format!("Repeat: {repeat:?}"));
            Ok(())
        }
        Command::ToggleShuffle => {
            let on = session.toggle_shuffle();
            app.set_status(if on { "Shuffle on" } else { "Shuffle off" });
            Ok(())
        }
        Command::CycleVisualizer => {
            let style = app.cycle_visualizer();
            app.set_status(format!("Visualizer: {}", style.label()));
            Ok(())
        }
        Command::CycleEqPreset => {
            let next = session
                .equalizer()
                .preset()
                .map_or(Preset::Flat, Preset::cycle);
            app.set_status(format!("EQ: {}", next.name()));
            session.apply_equalizer_preset(next)
        }
        Command::CursorDown => {
            app.follow_playback_off();
            app.next(len);
            Ok(())
        }
        Command::CursorUp => {
            app.follow_playback_off();
            app.prev(len);
            Ok(())
        }
        Command::CursorTop => {
            app.follow_playback_off();
            app.set_selected(0, len);
            Ok(())
        }
        Command::CursorBottom => {
            app.follow_playback_off();
            app.set_selected(len.saturating_sub(1), len);
            Ok(())
        }
        Command::PlaySelected => {
            if len == 0 {
                Ok(())
            } else {
                app.follow_playback_on();
                session.play_index(app.selected)
            }
        }
        Command::ToggleMetadata => {
            app.toggle_metadata_window();
            Ok(())
        }
        Command::Rescan => {
            startup::load_library(session, app, settings, &[]);
            Ok(())
        }
    };

    match result {
        Err(e) => {
            warn!(?cmd, error = %e, "command failed");
            app.report(&e);
        }
        // a track that plays again supersedes the last load error
        Ok(()) if matches!(cmd, Command::Next | Command::Previous | Command::PlaySelected) => {
            if app.status().is_some_and(|s| s.is_error) {
                app.clear_status();
            }
        }
        Ok(()) => {}
    }
    app.follow(session.current_index());
    false
}

/// Press, drag and release on the progress bar map onto a drag-seek.
pub fn handle_mouse(mouse: MouseEvent, session: &mut PlaybackSession, area: Rect) -> Result<()> {
    let target = session
        .duration()
        .mul_f64(ui::fraction_at(area, mouse.column));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let inside = area.contains(Position::new(mouse.column, mouse.row));
            if inside && !session.duration().is_zero() && session.begin_seek_drag() {
                session.drag_seek(target);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => session.drag_seek(target),
        MouseEventKind::Up(MouseButton::Left) => {
            session.end_seek_drag()?;
        }
        _ => {}
    }
    Ok(())
}
