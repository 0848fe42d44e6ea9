mod app;
mod audio;
mod cli;
mod config;
mod error;
mod library;
mod playback;
mod runtime;
mod scheduler;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
