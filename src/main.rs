mod cli;
mod error;
mod files;
mod grid;
mod launcher;
mod loader;
mod pager;
mod ui;
mod video;

use clap::Parser;
use std::process::ExitCode;
use winit::event_loop::EventLoop;

use crate::cli::{default_movie_list, Cli};
use crate::error::SodiumError;
use crate::files::Catalog;
use crate::grid::GridLayout;
use crate::launcher::Launcher;
use crate::ui::state::BrowserState;
use crate::ui::App;
use crate::video::VideoLookup;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SodiumError> {
    let catalog = Catalog::scan(&cli.image_dir)?;
    if catalog.is_empty() {
        log::error!("No image files found.");
        return Ok(());
    }

    let movie_list = cli
        .movie_list
        .clone()
        .or_else(default_movie_list)
        .ok_or(SodiumError::NoHomeDir)?;
    log::info!("Using movie list {}", movie_list.display());
    let lookup = VideoLookup::new(movie_list, Some(cli.video_base()));

    let (cols, rows) = cli.size;
    let grid = GridLayout::new(rows, cols, cli.cell_size, cli.cell_size);

    let state = BrowserState::new(
        catalog,
        grid,
        lookup,
        Launcher::new(),
        cli.initial_delay as f64 / 1000.0,
        cli.repeat_delay as f64 / 1000.0,
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(state);
    event_loop.run_app(&mut app)?;

    match app.fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
