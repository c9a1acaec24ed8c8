use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use uci::{MessageSink, SocketConnection, Transport, WorkerConnection};

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendVariant {
    /// Engine process on this machine, driven by a worker thread
    Local,
    /// Engine served over TCP
    Remote,
}

/// What a backend variant supports. Chosen once per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendProfile {
    pub variant: BackendVariant,
    pub label: &'static str,
    pub supports_threads: bool,
    pub supports_wdl: bool,
    /// The transport reports `Ready` before the handshake may start.
    pub announces_ready: bool,
}

impl BackendVariant {
    pub fn profile(self) -> BackendProfile {
        match self {
            BackendVariant::Local => BackendProfile {
                variant: self,
                label: "Local",
                supports_threads: true,
                supports_wdl: true,
                announces_ready: true,
            },
            BackendVariant::Remote => BackendProfile {
                variant: self,
                label: "Remote",
                supports_threads: false,
                supports_wdl: false,
                announces_ready: false,
            },
        }
    }
}

/// Opens transports for a backend variant. Inbound traffic goes to `sink`.
pub trait Launcher {
    fn launch(
        &mut self,
        variant: BackendVariant,
        sink: MessageSink,
    ) -> Result<Box<dyn Transport>, EngineError>;
}

pub struct EngineLauncher {
    engine_path: PathBuf,
    engine_args: Vec<String>,
    remote_address: String,
    connect_timeout: Duration,
}

impl EngineLauncher {
    pub fn new(
        engine_path: PathBuf,
        engine_args: Vec<String>,
        remote_address: String,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            engine_path,
            engine_args,
            remote_address,
            connect_timeout,
        }
    }
}

impl Launcher for EngineLauncher {
    fn launch(
        &mut self,
        variant: BackendVariant,
        sink: MessageSink,
    ) -> Result<Box<dyn Transport>, EngineError> {
        match variant {
            // Process start failures arrive later as a Fault through the sink
            BackendVariant::Local => Ok(Box::new(WorkerConnection::spawn(
                self.engine_path.clone(),
                self.engine_args.clone(),
                sink,
            ))),
            BackendVariant::Remote => SocketConnection::connect(&self.remote_address, self.connect_timeout, sink)
                .map(|connection| Box::new(connection) as Box<dyn Transport>)
                .map_err(|e| {
                    EngineError::Launch(format!("{}: {}", self.remote_address, e))
                }),
        }
    }
}
