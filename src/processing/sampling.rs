use std::time::Duration;

use tokio::time::sleep;

use crate::hardware::AnalogSensor;

/// Default number of raw reads averaged per sample
pub const DEFAULT_SAMPLES: u16 = 16;

/// Settling delay after each raw read
pub const DEFAULT_SAMPLE_DELAY: Duration = Duration::from_millis(2);

/// Averages several raw reads to suppress analog noise
///
/// Each call stalls the loop for about `samples * delay`.
pub struct Sampler {
    sensor: Box<dyn AnalogSensor>,
    samples: usize,
    delay: Duration,
}

impl Sampler {
    pub fn new(sensor: Box<dyn AnalogSensor>, samples: usize, delay: Duration) -> Self {
        Self {
            sensor,
            samples: samples.max(1),
            delay,
        }
    }

    #[cfg(test)]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Floor-divided average of `samples` raw reads
    pub async fn sample_average(&mut self) -> u16 {
        let mut sum: u64 = 0;
        for _ in 0..self.samples {
            sum += u64::from(self.sensor.read_raw());
            sleep(self.delay).await;
        }

        let average = (sum / self.samples as u64) as u16;
        tracing::trace!("Sampled raw average {} over {} reads", average, self.samples);
        average
    }
}
