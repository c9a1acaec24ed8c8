mod connection;
mod decoder;
mod encoder;
mod options;

pub mod commands;

pub use commands::{UciInput, UciOutput};
pub use connection::{MessageSink, SocketConnection, Transport, TransportMessage, WorkerConnection};
pub use decoder::{is_null_move, Decoder};
pub use encoder::Encoder;
pub use options::{UciOption, UciOptionType};
