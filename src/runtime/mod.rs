use std::sync::mpsc;

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::app::App;
use crate::audio::RodioEngine;
use crate::cli::Args;
use crate::playback::ControlEvent;

mod event_loop;
mod logging;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let (mut settings, config_problem) = settings::load_settings();
    args.apply(&mut settings);

    match logging::init(&settings.logging) {
        Ok(Some(path)) => info!(log = %path.display(), "cadenza starting"),
        Ok(None) => {}
        Err(e) => eprintln!("cadenza: logging disabled: {e}"),
    }
    if let Some(problem) = config_problem {
        settings::report_config_problem(&problem);
    }

    let (events_tx, events_rx) = mpsc::channel::<ControlEvent>();
    let engine = RodioEngine::open()?;
    let mut session = startup::build_session(Box::new(engine), events_tx, &settings);
    let mut app = App::new(settings.ui.visualizer);
    startup::load_library(&mut session, &mut app, &settings, &args.add);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&settings);
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut session,
            &events_rx,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("cadenza exiting");
    run_result
}
