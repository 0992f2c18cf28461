use crate::hardware::{DigitalOutput, Level};

/// Pump relay with polarity handling and an optional status indicator
///
/// `pump_on` is the single source of truth for relay state; every change
/// goes through [`PumpDriver::set_pump`] so the indicator stays mirrored.
pub struct PumpDriver {
    relay: Box<dyn DigitalOutput>,
    indicator: Option<Box<dyn DigitalOutput>>,
    active_low: bool,
    pump_on: bool,
}

impl PumpDriver {
    /// Create the driver and force the pump off
    pub fn new(
        relay: Box<dyn DigitalOutput>,
        indicator: Option<Box<dyn DigitalOutput>>,
        active_low: bool,
    ) -> Self {
        let mut driver = Self {
            relay,
            indicator,
            active_low,
            pump_on: false,
        };
        driver.set_pump(false);
        driver
    }

    pub fn set_pump(&mut self, on: bool) {
        // active-low relays energise on a low level
        self.relay.write_level(Level::from(on != self.active_low));

        if let Some(indicator) = self.indicator.as_mut() {
            indicator.write_level(Level::from(on));
        }

        if self.pump_on != on {
            tracing::info!(
                "Pump {} ({})",
                if on { "ON" } else { "OFF" },
                self.relay.name()
            );
        }
        self.pump_on = on;
    }

    pub fn is_on(&self) -> bool {
        self.pump_on
    }
}
