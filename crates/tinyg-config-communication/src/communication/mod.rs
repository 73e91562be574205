//! Line channel abstraction
//!
//! The configuration driver needs three things from the link to the
//! controller: the link was opened, a line can be sent, and a line can be
//! received within a deadline. [`LineChannel`] captures the last two; opening
//! is up to each implementation.

pub mod serial;

use std::time::Duration;
use tinyg_config_core::Result;

/// Serial parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerialParity {
    /// No parity bit
    #[default]
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Parameters for opening a serial connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// RTS/CTS hardware flow control
    pub flow_control: bool,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115200,
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            flow_control: false,
        }
    }
}

/// A bidirectional, newline-delimited text channel
pub trait LineChannel {
    /// Send `line` followed by a newline
    fn send_line(&mut self, line: &str) -> Result<()>;

    /// Wait up to `timeout` for the next complete line.
    ///
    /// Returns `Ok(None)` if no line arrived in time. The returned line has
    /// its line terminator removed.
    fn receive_line(&mut self, timeout: Duration) -> Result<Option<String>>;
}

impl<C: LineChannel + ?Sized> LineChannel for Box<C> {
    fn send_line(&mut self, line: &str) -> Result<()> {
        (**self).send_line(line)
    }

    fn receive_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        (**self).receive_line(timeout)
    }
}
