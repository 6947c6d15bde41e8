//! # Serial Communication Module
//!
//! Handles the serial link to the GNSS receiver.
//!
//! This module handles:
//! - Opening the receiver's serial port (8N1) from a list of candidate paths
//! - Non-blocking "bytes available" checks
//! - Handing out received bytes one at a time to the decoder

mod port_trait;

pub use port_trait::ByteSource;

#[cfg(test)]
pub use port_trait::mocks;

use std::collections::VecDeque;
use std::io::Read;
use std::time::Duration;

use crate::error::{FieldLoggerError, Result};
use tracing::{debug, info, warn};

/// Default NMEA baud rate for common GNSS modules
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout; reads are only issued for bytes already reported pending
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Upper bound for a single pull from the port into the local buffer
const MAX_PULL: usize = 512;

/// GNSS receiver serial port
///
/// Bytes pending on the port are pulled into a local buffer in one read and
/// then handed out one by one through [`ByteSource`].
pub struct SerialTransport {
    /// Serial port handle
    port: Box<dyn tokio_serial::SerialPort>,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
    /// Bytes read from the port but not yet handed out
    pending: VecDeque<u8>,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("device_path", &self.device_path)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl SerialTransport {
    /// Open the receiver by trying each path in order
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyUSB0"])
    /// * `baud_rate` - Receiver baud rate
    ///
    /// # Errors
    ///
    /// Returns [`FieldLoggerError::SerialPortNotFound`] listing every path
    /// tried if none could be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use field_logger::serial::SerialTransport;
    ///
    /// let serial = SerialTransport::open_with_paths(&["/dev/ttyUSB0"], 9600)?;
    /// println!("Connected to: {}", serial.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened GNSS receiver at {} ({} baud)", path, baud_rate);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                        pending: VecDeque::new(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(FieldLoggerError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with 8N1 settings
    fn open_port(path: &str, baud_rate: u32) -> Result<Box<dyn tokio_serial::SerialPort>> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| FieldLoggerError::Serial(format!("Failed to open {}: {}", path, e)))
    }

    /// Bytes waiting in the OS buffer
    fn port_pending(&self) -> usize {
        match self.port.bytes_to_read() {
            Ok(n) => n as usize,
            Err(e) => {
                debug!("bytes_to_read failed on {}: {}", self.device_path, e);
                0
            }
        }
    }

    /// Move pending bytes from the port into the local buffer
    fn pull(&mut self) {
        let want = self.port_pending().min(MAX_PULL);
        if want == 0 {
            return;
        }

        let mut buf = [0u8; MAX_PULL];
        match self.port.read(&mut buf[..want]) {
            Ok(n) => self.pending.extend(&buf[..n]),
            Err(e) => debug!("Serial read failed on {}: {}", self.device_path, e),
        }
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

impl ByteSource for SerialTransport {
    fn available(&mut self) -> usize {
        self.pending.len() + self.port_pending()
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.pending.is_empty() {
            self.pull();
        }
        self.pending.pop_front()
    }
}
