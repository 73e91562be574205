//! Serial port line channel
//!
//! Provides a [`LineChannel`] over a USB or RS-232 serial port using the
//! `serialport` crate. Incoming bytes are buffered until a newline arrives;
//! partial lines are kept for the next call.

use crate::communication::{ConnectionParams, LineChannel, SerialParity};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use tinyg_config_core::{ConnectionError, Result};

/// Longest line returned without a terminator. The controller never sends
/// lines this long; anything longer is handed up as-is and fails to parse.
pub const MAX_RECEIVE_LINE: usize = 512;

/// Bytes received but not yet returned as a line
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes
    pub fn extend(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the next complete line without its terminator.
    ///
    /// [`MAX_RECEIVE_LINE`] bytes with no newline are returned as one line.
    pub fn take_line(&mut self) -> Option<String> {
        let end = match self.pending.iter().position(|&b| b == b'\n') {
            Some(newline) => newline + 1,
            None if self.pending.len() >= MAX_RECEIVE_LINE => MAX_RECEIVE_LINE,
            None => return None,
        };
        let raw: Vec<u8> = self.pending.drain(..end).collect();
        let line = String::from_utf8_lossy(&raw);
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Serial port channel to the controller
pub struct SerialChannel {
    port: Box<dyn serialport::SerialPort>,
    port_name: String,
    buffer: LineBuffer,
}

/// Convert a parity setting to serialport format
fn to_serialport_parity(parity: SerialParity) -> serialport::Parity {
    match parity {
        SerialParity::None => serialport::Parity::None,
        SerialParity::Even => serialport::Parity::Even,
        SerialParity::Odd => serialport::Parity::Odd,
    }
}

fn io_error(err: io::Error) -> ConnectionError {
    ConnectionError::IoError {
        reason: err.to_string(),
    }
}

impl SerialChannel {
    /// Open a serial port with the given parameters
    pub fn open(params: &ConnectionParams) -> Result<Self> {
        let data_bits = match params.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => {
                return Err(ConnectionError::InvalidParameters {
                    reason: format!("Invalid data bits: {}", other),
                }
                .into())
            }
        };
        let stop_bits = match params.stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            other => {
                return Err(ConnectionError::InvalidParameters {
                    reason: format!("Invalid stop bits: {}", other),
                }
                .into())
            }
        };

        let builder = serialport::new(&params.port, params.baud_rate)
            .timeout(Duration::from_millis(10))
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(to_serialport_parity(params.parity))
            .flow_control(if params.flow_control {
                serialport::FlowControl::Hardware
            } else {
                serialport::FlowControl::None
            });

        match builder.open() {
            Ok(port) => {
                tracing::info!("Opened {} at {} baud", params.port, params.baud_rate);
                Ok(Self {
                    port,
                    port_name: params.port.clone(),
                    buffer: LineBuffer::new(),
                })
            }
            Err(e) => {
                tracing::warn!("Failed to open serial port {}: {}", params.port, e);
                Err(ConnectionError::FailedToOpen {
                    port: params.port.clone(),
                    reason: e.to_string(),
                }
                .into())
            }
        }
    }

    /// Name of the open port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl LineChannel for SerialChannel {
    fn send_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.port.write_all(&data).map_err(io_error)?;
        self.port.flush().map_err(io_error)?;
        Ok(())
    }

    fn receive_line(&mut self, timeout: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(line) = self.buffer.take_line() {
                return Ok(Some(line));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            self.port
                .set_timeout(remaining)
                .map_err(|e| ConnectionError::IoError {
                    reason: e.to_string(),
                })?;

            fill_buffer(&mut self.port, &mut self.buffer, &self.port_name)?;
        }
    }
}

/// One read from `reader` into `buffer`. A read timeout adds nothing; end of
/// input means the port is gone.
fn fill_buffer<R: Read + ?Sized>(
    reader: &mut R,
    buffer: &mut LineBuffer,
    port_name: &str,
) -> Result<()> {
    let mut buf = [0u8; 256];
    match reader.read(&mut buf) {
        Ok(0) => Err(ConnectionError::IoError {
            reason: format!("{} closed", port_name),
        }
        .into()),
        Ok(n) => {
            buffer.extend(&buf[..n]);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(()),
        Err(e) => Err(io_error(e).into()),
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("port_name", &self.port_name)
            .field("pending", &self.buffer.len())
            .finish()
    }
}
