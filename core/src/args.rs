use std::path::PathBuf;

use clap::Parser;

use crate::backend::BackendVariant;

#[derive(Parser, Debug)]
#[command(name = "Analyser")]
#[command(author = "Jørgen Hanssen <jorgen@hanssen.io>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live chess engine analysis over UCI")]
pub struct Args {
    /// Path to the UCI engine binary for the local backend.
    #[arg(short, long, default_value = "stockfish")]
    pub engine: PathBuf,

    /// Extra arguments passed to the local engine.
    #[arg(long = "engine-arg", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// Address of a UCI engine served over TCP.
    #[arg(short, long, default_value = "127.0.0.1:9999")]
    pub remote: String,

    /// Backend used when the engine is enabled.
    #[arg(short, long, value_enum, default_value = "local")]
    pub backend: BackendVariant,

    /// Hash table size in MB.
    #[arg(long)]
    pub hash: Option<u32>,

    /// Search threads for backends that support them.
    #[arg(long)]
    pub threads: Option<u32>,

    /// Do not ask the engine for win/draw/loss statistics.
    #[arg(long)]
    pub no_wdl: bool,

    /// Starting position. Defaults to the standard initial position.
    #[arg(long)]
    pub fen: Option<String>,

    /// Enable the engine at startup.
    #[arg(long)]
    pub enable: bool,

    /// Quiet period before analysing a changed position.
    #[arg(long, default_value_t = 20)]
    pub debounce_ms: u64,

    /// How long to wait for uciok before probing readiness.
    #[arg(long, default_value_t = 5000)]
    pub handshake_timeout_ms: u64,

    /// Log engine communication to a file for debugging.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,
}
