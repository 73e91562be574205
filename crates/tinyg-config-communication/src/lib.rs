//! # tinyg-config Communication
//!
//! Talks to a TinyG controller over a line-oriented channel.
//!
//! - [`communication`]: the [`LineChannel`] abstraction and its serial port
//!   implementation
//! - [`firmware::tinyg`]: reply classification and the configuration
//!   transfer driver (read every group, write groups back in chunks)

pub mod communication;
pub mod firmware;

pub use communication::{
    serial::{LineBuffer, SerialChannel, MAX_RECEIVE_LINE},
    ConnectionParams, LineChannel, SerialParity,
};

pub use firmware::tinyg::{
    TinyGConfigDriver, TinyGReply, TinyGResponseParser, TransferReport, WriteOutcome,
    DEFAULT_REPLY_TIMEOUT, MAX_COMMAND_LINE, MAX_KEYS_PER_WRITE,
};
