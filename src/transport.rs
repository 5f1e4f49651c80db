use std::io::{Read, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::debug;
use serialport::{DataBits, Parity, SerialPort, StopBits};

pub const LINE_TERMINATOR: u8 = b'\n';

/// One byte-duplex endpoint, exclusively owned for a single acquisition
/// cycle: opened, used and dropped within that cycle.
pub trait Link {
    fn send(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Block until a line terminator arrives or the read timeout expires,
    /// returning whatever was received (terminator stripped). A timeout is
    /// not an error at this level; the caller decides what an incomplete
    /// line means.
    fn read_line(&mut self) -> Result<String>;
}

/// Opens a fresh [`Link`] for each acquisition cycle, with the acquisition
/// window as the read timeout.
pub trait Connect {
    type Link: Link;

    fn connect(&self, read_timeout: Duration) -> Result<Self::Link>;
}

/// Serial endpoint description. The logger streams over its native USB
/// port, so the baud rate is nominal; 8N1 matches the device.
#[derive(Clone, Debug)]
pub struct SerialSettings {
    pub port: String,
    pub baud: u32,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub data_bits: DataBits,
}

impl SerialSettings {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud: 115_200,
            parity: Parity::None,
            stop_bits: StopBits::One,
            data_bits: DataBits::Eight,
        }
    }
}

impl Connect for SerialSettings {
    type Link = SerialLink;

    fn connect(&self, read_timeout: Duration) -> Result<SerialLink> {
        let port = serialport::new(&self.port, self.baud)
            .parity(self.parity)
            .stop_bits(self.stop_bits)
            .data_bits(self.data_bits)
            .timeout(read_timeout)
            .open()
            .with_context(|| {
                format!(
                    "failed to open serial port '{}' at {} baud",
                    self.port, self.baud
                )
            })?;
        debug!(
            "serial port '{}' open, read timeout {:?}",
            self.port, read_timeout
        );
        Ok(SerialLink { port, read_timeout })
    }
}

pub struct SerialLink {
    port: Box<dyn SerialPort>,
    read_timeout: Duration,
}

impl Link for SerialLink {
    fn send(&mut self, bytes: &[u8]) -> Result<usize> {
        self.port
            .write_all(bytes)
            .context("failed to write to serial port")?;
        self.port.flush().context("failed to flush serial port")?;
        Ok(bytes.len())
    }

    fn read_line(&mut self) -> Result<String> {
        // The port timeout applies per read call; the deadline bounds the
        // whole line even when bytes keep trickling in.
        let deadline = Instant::now() + self.read_timeout;
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == LINE_TERMINATOR {
                        break;
                    }
                    line.push(byte[0]);
                }
                // Window expired: hand back the partial line.
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e).context("serial read failed"),
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_8n1() {
        let settings = SerialSettings::new("/dev/ttyACM0");
        assert_eq!(settings.port, "/dev/ttyACM0");
        assert_eq!(settings.baud, 115_200);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.data_bits, DataBits::Eight);
    }
}
