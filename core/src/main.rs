mod args;
mod backend;
mod config;
mod controller;
mod error;
mod evaluation;
mod input;
mod lifecycle;
mod presenter;
mod rules;
mod scheduler;
mod timers;
mod view;

#[cfg(test)]
mod tests;

use std::error::Error;
use std::fs::File;
use std::io;
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

use args::Args;
use backend::EngineLauncher;
use clap::Parser;
use config::Settings;
use controller::{Controller, Event, UiCommand};
use log::{info, LevelFilter};
use simplelog::{Config, SimpleLogger, WriteLogger};
use utils::Game;
use view::TerminalView;

fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;
    let settings = settings(&args)?;

    let game = match &args.fen {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::default(),
    };

    let (events, rx) = channel();

    let launcher = EngineLauncher::new(
        settings.engine_path.clone(),
        settings.engine_args.clone(),
        settings.remote_address.clone(),
        settings.handshake_timeout,
    );
    let mut controller = Controller::new(
        settings,
        Box::new(launcher),
        Box::new(game),
        Box::new(TerminalView::default()),
        events.clone(),
    );

    let quit = events.clone();
    ctrlc::set_handler(move || {
        let _ = quit.send(Event::Quit);
    })?;

    let input = events.clone();
    thread::spawn(move || input::read_commands(io::stdin().lock(), input));

    if args.enable {
        events.send(Event::Ui(UiCommand::Enable))?;
    }

    info!("Analyser started");
    controller.run(rx);

    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();

    if let Some(log_file) = &args.log_file {
        WriteLogger::init(
            LevelFilter::Debug,
            Config::default(),
            File::create(log_file)?,
        )?;
    } else {
        SimpleLogger::init(LevelFilter::Warn, Config::default())?;
    }

    Ok(args)
}

fn settings(args: &Args) -> Result<Settings, Box<dyn Error>> {
    let mut settings = Settings {
        backend: args.backend,
        engine_path: args.engine.clone(),
        engine_args: args.engine_args.clone(),
        remote_address: args.remote.clone(),
        debounce: Duration::from_millis(args.debounce_ms),
        handshake_timeout: Duration::from_millis(args.handshake_timeout_ms),
        ..Settings::default()
    };

    if let Some(hash) = args.hash {
        settings.options.update("Hash", &hash.to_string())?;
    }
    if let Some(threads) = args.threads {
        settings.options.update("Threads", &threads.to_string())?;
    }
    if args.no_wdl {
        settings.options.update("UCI_ShowWDL", "false")?;
    }

    Ok(settings)
}
