use std::{process::ExitCode, sync::Arc, time::Instant};

use anyhow::anyhow;
use egui::mutex::Mutex;
use log::error;
use pathrace::{Game, GameConfig};
use rand::{rngs::StdRng, SeedableRng};

mod app;
mod event;

fn run() -> anyhow::Result<()> {
    let config = GameConfig::default();
    let game = Game::new(config, StdRng::from_entropy(), Instant::now())?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Human vs AI Pathfinding")
            .with_inner_size(app::window_size(game.config()))
            .with_resizable(false),
        ..Default::default()
    };

    let failure: app::Failure = Arc::new(Mutex::new(None));
    let app_failure = failure.clone();

    eframe::run_native(
        "Human vs AI Pathfinding",
        options,
        Box::new(move |_cc| Box::new(app::App::new(game, app_failure))),
    )
    .map_err(|e| anyhow!("failed to start the window: {}", e))?;

    // take the error out before the lock guard is dropped at the end of the statement
    let failure = failure.lock().take();
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    // log to stderr (if you run with `RUST_LOG=debug`)
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
