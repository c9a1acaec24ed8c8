use super::commands::UciInput;
use super::encoder::Encoder;
use log::debug;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Messages a transport delivers to the coordinator, in the order they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMessage {
    /// The worker finished loading the engine; the handshake may start.
    Ready,
    /// Progress chatter from the worker while loading.
    Diagnostic(String),
    /// A line the engine wrote to stderr.
    Stderr(String),
    /// The worker or channel failed.
    Fault(String),
    /// A protocol line from the engine.
    Line(String),
    /// The engine's output stream ended.
    Closed,
}

pub type MessageSink = Arc<dyn Fn(TransportMessage) + Send + Sync>;

/// Outbound half of an engine connection. Inbound traffic goes to the sink
/// the transport was created with.
pub trait Transport: Send {
    fn send(&mut self, command: &UciInput) -> io::Result<()>;
    fn shutdown(&mut self);
}

/// Runs the engine as a child process behind a worker thread.
///
/// The worker launches the process, reports `Ready` once its pipes are up and
/// then forwards commands. Commands sent while the worker is still loading
/// wait in the channel and are written in order afterwards.
pub struct WorkerConnection {
    commands: Option<Sender<String>>,
    encoder: Encoder,
}

impl WorkerConnection {
    pub fn spawn(path: PathBuf, args: Vec<String>, sink: MessageSink) -> Self {
        let (commands, command_rx) = channel();

        thread::spawn(move || run_worker(path, args, command_rx, sink));

        Self {
            commands: Some(commands),
            encoder: Encoder {},
        }
    }
}

impl Transport for WorkerConnection {
    fn send(&mut self, command: &UciInput) -> io::Result<()> {
        let out_line = self.encoder.encode(command);
        debug!("Output: {:?}", out_line);

        self.commands
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "worker shut down"))?
            .send(out_line)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "engine worker has stopped"))
    }

    fn shutdown(&mut self) {
        // Dropping the sender ends the worker loop, which then reaps the process
        self.commands.take();
    }
}

impl Drop for WorkerConnection {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(path: PathBuf, args: Vec<String>, commands: Receiver<String>, sink: MessageSink) {
    sink(TransportMessage::Diagnostic(format!(
        "Launching {}",
        path.display()
    )));

    let mut child = match Command::new(&path)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            sink(TransportMessage::Fault(format!(
                "Failed to launch {}: {}",
                path.display(),
                e
            )));
            return;
        }
    };

    let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
        sink(TransportMessage::Fault("Engine pipes unavailable".to_string()));
        reap(&mut child);
        return;
    };

    spawn_line_reader(stdout, Arc::clone(&sink), TransportMessage::Line, true);
    if let Some(stderr) = child.stderr.take() {
        spawn_line_reader(stderr, Arc::clone(&sink), TransportMessage::Stderr, false);
    }

    sink(TransportMessage::Diagnostic("Initialized".to_string()));
    sink(TransportMessage::Ready);

    let mut stdin = BufWriter::new(stdin);
    while let Ok(line) = commands.recv() {
        if let Err(e) = writeln!(stdin, "{}", line).and_then(|_| stdin.flush()) {
            sink(TransportMessage::Fault(format!("Failed to write to engine: {}", e)));
            break;
        }
        if line == "quit" {
            break;
        }
    }

    drop(stdin);
    reap(&mut child);
}

// Give the engine a moment to exit on its own, then force it
fn reap(child: &mut Child) {
    for _ in 0..10 {
        match child.try_wait() {
            Ok(Some(_)) => return,
            Ok(None) => thread::sleep(Duration::from_millis(10)),
            Err(_) => break,
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Talks to an engine served over TCP, one protocol line per text line.
pub struct SocketConnection {
    stream: TcpStream,
    encoder: Encoder,
}

impl SocketConnection {
    /// Connects within `timeout`, trying each resolved address in turn.
    pub fn connect(address: &str, timeout: Duration, sink: MessageSink) -> io::Result<Self> {
        let stream = connect_any(address, timeout)?;
        stream.set_nodelay(true)?;

        let reader = stream.try_clone()?;
        spawn_line_reader(reader, sink, TransportMessage::Line, true);

        Ok(Self {
            stream,
            encoder: Encoder {},
        })
    }
}

impl Transport for SocketConnection {
    fn send(&mut self, command: &UciInput) -> io::Result<()> {
        let out_line = self.encoder.encode(command);
        debug!("Output: {:?}", out_line);

        writeln!(self.stream, "{}", out_line)?;
        self.stream.flush()
    }

    fn shutdown(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

fn connect_any(address: &str, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_error = None;

    for addr in address.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} did not resolve to any address", address),
        )
    }))
}

fn spawn_line_reader<R>(
    reader: R,
    sink: MessageSink,
    wrap: fn(String) -> TransportMessage,
    report_close: bool,
) where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        for line in BufReader::new(reader).lines() {
            match line {
                Ok(line) => {
                    debug!("Input: {:?}", line);
                    sink(wrap(line));
                }
                Err(e) => {
                    sink(TransportMessage::Fault(format!(
                        "Failed to read from engine: {}",
                        e
                    )));
                    break;
                }
            }
        }

        if report_close {
            sink(TransportMessage::Closed);
        }
    });
}
