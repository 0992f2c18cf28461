use std::time::Duration;

use tokio::time::Instant;

use crate::service::state::Controller;

/// Percentage points either side of the threshold with no action
pub const HYSTERESIS_MARGIN: i16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoState {
    Idle,
    Watering,
}

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Inside the band, or nothing to change
    NoChange { percent: u8 },
    /// Soil below the low band: ran one timed watering cycle
    Watered { percent: u8, seconds: u8 },
    /// Soil above the high band with the pump left on: forced off
    ForcedOff { percent: u8 },
}

/// Hysteresis controller for automatic watering
///
/// Rate-limited to one evaluation per `interval`. A watering cycle is
/// self-contained: the pump is switched on, held for `water_seconds`, and
/// switched off before [`AutoController::evaluate`] returns.
pub struct AutoController {
    interval: Duration,
    hold_poll: Duration,
    last_evaluation: Instant,
    state: AutoState,
}

impl AutoController {
    pub fn new(interval: Duration, hold_poll: Duration) -> Self {
        Self {
            interval,
            hold_poll,
            last_evaluation: Instant::now(),
            state: AutoState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> AutoState {
        self.state
    }

    /// Evaluate if auto mode is on and the interval has elapsed
    pub async fn tick(&mut self, ctl: &mut Controller) -> Option<Decision> {
        if !ctl.settings.auto_mode {
            return None;
        }

        let now = Instant::now();
        if now.duration_since(self.last_evaluation) <= self.interval {
            return None;
        }
        self.last_evaluation = now;

        tracing::trace!("Auto evaluation from {:?}", self.state);
        Some(self.evaluate(ctl).await)
    }

    /// One unconditional evaluation against a fresh sample
    pub async fn evaluate(&mut self, ctl: &mut Controller) -> Decision {
        let percent = ctl.moisture_percent().await;
        let threshold = i16::from(ctl.settings.threshold_percent);
        let low = threshold - HYSTERESIS_MARGIN;
        let high = threshold + HYSTERESIS_MARGIN;
        let value = i16::from(percent);

        if value < low && !ctl.pump.is_on() {
            let seconds = ctl.settings.water_seconds;
            tracing::info!(
                "Moisture {}% below {}%: watering for {} s",
                percent,
                low,
                seconds
            );

            self.state = AutoState::Watering;
            ctl.water_for(Duration::from_secs(u64::from(seconds)), self.hold_poll)
                .await;
            self.state = AutoState::Idle;

            Decision::Watered { percent, seconds }
        } else if value > high && ctl.pump.is_on() {
            tracing::info!("Moisture {}% above {}%: forcing pump off", percent, high);
            ctl.pump.set_pump(false);
            Decision::ForcedOff { percent }
        } else {
            Decision::NoChange { percent }
        }
    }
}
