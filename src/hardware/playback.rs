use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;

use super::AnalogSensor;
use crate::error::ControllerError;

// Optional ISO8601 timestamp, then the raw value
static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})?)\s+)?(\d+)$")
        .unwrap()
});

/// Sensor that replays raw readings recorded by `--calibrate` or by hand
///
/// Format, one reading per line:
/// ```text
/// # comment
/// 2025-06-01T07:00:00 43120
/// 42980
/// ```
pub struct PlaybackSensor {
    name: String,
    readings: Vec<u16>,
    position: usize,
    loop_playback: bool,
}

impl PlaybackSensor {
    pub fn from_file(path: &Path, loop_playback: bool) -> Result<Self, ControllerError> {
        let content = std::fs::read_to_string(path)?;
        let readings = parse_readings(&content);

        if readings.is_empty() {
            return Err(ControllerError::Config(format!(
                "{} contains no raw readings",
                path.display()
            )));
        }

        tracing::info!(
            "Loaded {} raw readings from {} (loop: {})",
            readings.len(),
            path.display(),
            loop_playback
        );

        Ok(Self::new(
            path.display().to_string(),
            readings,
            loop_playback,
        ))
    }

    pub fn new(name: String, readings: Vec<u16>, loop_playback: bool) -> Self {
        Self {
            name,
            readings,
            position: 0,
            loop_playback,
        }
    }
}

/// Parse every valid reading line, skipping comments and malformed lines
pub fn parse_readings(content: &str) -> Vec<u16> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let caps = LINE_REGEX.captures(line)?;
            if let Some(ts) = caps.get(1) {
                valid_timestamp(ts.as_str()).then_some(())?;
            }
            caps[2].parse::<u16>().ok()
        })
        .collect()
}

fn valid_timestamp(ts: &str) -> bool {
    DateTime::parse_from_rfc3339(ts).is_ok()
        || NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S").is_ok()
}

impl AnalogSensor for PlaybackSensor {
    fn read_raw(&mut self) -> u16 {
        // Hold the final reading once a non-looping recording runs out
        let index = self.position.min(self.readings.len().saturating_sub(1));
        let raw = self.readings.get(index).copied().unwrap_or(0);

        self.position += 1;
        if self.position >= self.readings.len() && self.loop_playback {
            self.position = 0;
        }

        raw
    }

    fn name(&self) -> &str {
        &self.name
    }
}
