use sysfs_gpio::{Direction, Pin};

use super::{DigitalOutput, Level};
use crate::error::ControllerError;

/// Output line on the Linux sysfs GPIO interface
///
/// Exported and driven low on open, unexported on drop.
pub struct GpioOutput {
    pin: Pin,
    name: String,
}

impl GpioOutput {
    pub fn open(number: u64) -> Result<Self, ControllerError> {
        let pin = Pin::new(number);
        pin.export()?;
        pin.set_direction(Direction::Low)?;

        tracing::debug!("Exported GPIO{} as output", number);

        Ok(Self {
            pin,
            name: format!("GPIO{}", number),
        })
    }
}

impl DigitalOutput for GpioOutput {
    fn write_level(&mut self, level: Level) {
        if let Err(e) = self.pin.set_value(level.as_u8()) {
            tracing::error!("Could not drive {} to {}: {}", self.name, level.as_u8(), e);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for GpioOutput {
    fn drop(&mut self) {
        if let Err(e) = self.pin.unexport() {
            tracing::error!("Could not unexport pin {}: {}", self.pin.get_pin(), e);
        }
    }
}
