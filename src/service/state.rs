use std::time::Duration;

use tokio::time::sleep;

use crate::processing::calibration::Calibration;
use crate::processing::sampling::Sampler;
use crate::service::actuator::PumpDriver;

pub const THRESHOLD_RANGE: (i64, i64) = (0, 100);
pub const WATER_SECONDS_RANGE: (i64, i64) = (1, 30);

/// Runtime-mutable controller settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub calibration: Calibration,
    pub threshold_percent: u8,
    pub water_seconds: u8,
    pub auto_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            calibration: Calibration::new(60_000, 25_000),
            threshold_percent: 35,
            water_seconds: 4,
            auto_mode: false,
        }
    }
}

impl Settings {
    /// Store a threshold, clamped to 0-100
    pub fn set_threshold(&mut self, value: i64) -> u8 {
        self.threshold_percent = value.clamp(THRESHOLD_RANGE.0, THRESHOLD_RANGE.1) as u8;
        self.threshold_percent
    }

    /// Store a watering duration, clamped to 1-30 s
    pub fn set_water_seconds(&mut self, value: i64) -> u8 {
        self.water_seconds = value.clamp(WATER_SECONDS_RANGE.0, WATER_SECONDS_RANGE.1) as u8;
        self.water_seconds
    }
}

/// Everything the control loop owns
///
/// Handed by `&mut` to the auto-controller and the control-plane server in
/// turn; the loop is single-threaded so nothing here is shared.
pub struct Controller {
    pub settings: Settings,
    pub pump: PumpDriver,
    pub sampler: Sampler,
}

impl Controller {
    pub fn new(settings: Settings, pump: PumpDriver, sampler: Sampler) -> Self {
        Self {
            settings,
            pump,
            sampler,
        }
    }

    /// Freshly sampled moisture percentage
    pub async fn moisture_percent(&mut self) -> u8 {
        let raw = self.sampler.sample_average().await;
        let percent = self.settings.calibration.percent(raw);
        tracing::debug!("Moisture {}% (raw {})", percent, raw);
        percent
    }

    /// Run the pump for `duration`, waking every `poll` until the time is up
    ///
    /// Blocks the loop for the whole hold; nothing can interrupt it.
    pub async fn water_for(&mut self, duration: Duration, poll: Duration) {
        let poll = poll.max(Duration::from_millis(1));
        self.pump.set_pump(true);

        let start = tokio::time::Instant::now();
        while start.elapsed() < duration {
            sleep(poll.min(duration.saturating_sub(start.elapsed()))).await;
        }

        self.pump.set_pump(false);
    }
}
