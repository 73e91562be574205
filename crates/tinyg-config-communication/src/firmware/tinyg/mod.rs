//! TinyG JSON protocol
//!
//! Every command is one JSON object on one line. The controller answers a
//! command with an object carrying an `r` key, but may interleave status
//! reports (`sr`), queue reports (`qr`), and exception reports (`er`) at any
//! time.

pub mod config_transfer;
pub mod response_parser;

pub use config_transfer::{
    TinyGConfigDriver, TransferReport, WriteOutcome, DEFAULT_REPLY_TIMEOUT, MAX_COMMAND_LINE,
    MAX_KEYS_PER_WRITE,
};
pub use response_parser::{TinyGReply, TinyGResponseParser};
