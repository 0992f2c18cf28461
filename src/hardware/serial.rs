use std::io::{BufRead, BufReader, Write};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serialport::SerialPort;

use super::AnalogSensor;
use crate::error::ControllerError;

// Last unsigned integer on the line, e.g. "26 31750" or "ADC value: 31750"
static RAW_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*$").unwrap());

/// Moisture sensor behind a serial ADC bridge
///
/// The bridge answers `READ <pin>\n` with one line ending in the raw value.
pub struct SerialSensor {
    port_name: String,
    pin: u8,
    reader: BufReader<Box<dyn SerialPort>>,
    last_good: u16,
}

impl SerialSensor {
    pub fn open(port_name: &str, baud_rate: u32, pin: u8) -> Result<Self, ControllerError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(100))
            .open()?;

        tracing::info!(
            "Serial ADC bridge opened on {} at {} baud, pin {}",
            port_name,
            baud_rate,
            pin
        );

        Ok(Self {
            port_name: port_name.to_string(),
            pin,
            reader: BufReader::new(port),
            last_good: 0,
        })
    }

    /// List available serial ports (helper for CLI)
    pub fn list_available_ports() -> Result<Vec<serialport::SerialPortInfo>, ControllerError> {
        serialport::available_ports().map_err(ControllerError::SerialPort)
    }

    fn request_reading(&mut self) -> Result<u16, ControllerError> {
        let port = self.reader.get_mut();
        port.write_all(format!("READ {}\n", self.pin).as_bytes())?;
        port.flush()?;

        let mut line = String::new();
        self.reader.read_line(&mut line)?;

        parse_reply(&line)
    }
}

/// Extract the raw value from one bridge reply line
pub fn parse_reply(line: &str) -> Result<u16, ControllerError> {
    let trimmed = line.trim();
    RAW_REGEX
        .captures(trimmed)
        .and_then(|caps| caps[1].parse::<u16>().ok())
        .ok_or_else(|| ControllerError::Sensor(format!("no raw value in reply {:?}", trimmed)))
}

impl AnalogSensor for SerialSensor {
    fn read_raw(&mut self) -> u16 {
        match self.request_reading() {
            Ok(raw) => {
                self.last_good = raw;
                raw
            }
            Err(e) => {
                tracing::warn!(
                    "Sensor read on {} failed, reusing {}: {}",
                    self.port_name,
                    self.last_good,
                    e
                );
                self.last_good
            }
        }
    }

    fn name(&self) -> &str {
        &self.port_name
    }
}
