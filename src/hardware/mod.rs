pub mod gpio;
pub mod playback;
pub mod serial;
pub mod sim;

use std::path::PathBuf;

use crate::error::ControllerError;

/// A single noisy analog channel (no averaging, no calibration)
pub trait AnalogSensor {
    /// Take one instantaneous raw reading in the sensor's native range
    fn read_raw(&mut self) -> u16;

    /// Name of this sensor for logging and the status page
    fn name(&self) -> &str;
}

/// Electrical level of a digital output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn as_u8(&self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

/// A digital output line; polarity is the caller's concern
pub trait DigitalOutput {
    fn write_level(&mut self, level: Level);

    /// Name of this output for logging and the status page
    fn name(&self) -> &str;
}

/// Configuration for creating the moisture sensor
#[derive(Debug, Clone)]
pub enum SensorConfig {
    /// ADC bridge on a serial port
    Serial {
        port: String,
        baud_rate: u32,
        pin: u8,
    },
    /// Raw readings replayed from a file
    Playback { file: PathBuf, loop_playback: bool },
    /// Fixed raw value
    Simulated { raw: u16 },
}

impl SensorConfig {
    /// Open the sensor described by this configuration
    pub fn create_sensor(&self) -> Result<Box<dyn AnalogSensor>, ControllerError> {
        let sensor: Box<dyn AnalogSensor> = match self {
            SensorConfig::Serial {
                port,
                baud_rate,
                pin,
            } => Box::new(serial::SerialSensor::open(port, *baud_rate, *pin)?),
            SensorConfig::Playback {
                file,
                loop_playback,
            } => Box::new(playback::PlaybackSensor::from_file(file, *loop_playback)?),
            SensorConfig::Simulated { raw } => Box::new(sim::SimulatedSensor::new(*raw)),
        };
        Ok(sensor)
    }
}

/// Configuration for one digital output line
#[derive(Debug, Clone)]
pub enum OutputConfig {
    /// Linux sysfs GPIO line
    Gpio { pin: u64 },
    /// In-memory line, levels are only logged
    Simulated { name: String },
}

impl OutputConfig {
    pub fn create_output(&self) -> Result<Box<dyn DigitalOutput>, ControllerError> {
        let output: Box<dyn DigitalOutput> = match self {
            OutputConfig::Gpio { pin } => Box::new(gpio::GpioOutput::open(*pin)?),
            OutputConfig::Simulated { name } => Box::new(sim::SimulatedOutput::new(name.clone())),
        };
        Ok(output)
    }

    /// Short label for the status page
    pub fn label(&self) -> String {
        match self {
            OutputConfig::Gpio { pin } => format!("GPIO{}", pin),
            OutputConfig::Simulated { name } => format!("{} (simulated)", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_bool() {
        assert_eq!(Level::from(true), Level::High);
        assert_eq!(Level::from(false), Level::Low);
        assert_eq!(Level::High.as_u8(), 1);
        assert_eq!(Level::Low.as_u8(), 0);
    }

    #[test]
    fn test_create_simulated_sensor() {
        let config = SensorConfig::Simulated { raw: 31_750 };
        let mut sensor = config.create_sensor().unwrap();
        assert_eq!(sensor.read_raw(), 31_750);
    }

    #[test]
    fn test_create_missing_playback_file_fails() {
        let config = SensorConfig::Playback {
            file: PathBuf::from("/nonexistent/readings.log"),
            loop_playback: false,
        };
        assert!(matches!(
            config.create_sensor(),
            Err(ControllerError::Io(_))
        ));
    }

    #[test]
    fn test_output_labels() {
        assert_eq!(OutputConfig::Gpio { pin: 17 }.label(), "GPIO17");
        assert_eq!(
            OutputConfig::Simulated {
                name: "relay".into()
            }
            .label(),
            "relay (simulated)"
        );
    }
}
