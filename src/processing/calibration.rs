/// Two-point calibration for a capacitive soil-moisture probe
///
/// `dry_raw` maps to 0 %, `wet_raw` to 100 %. Wetter soil reads lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub dry_raw: u16,
    pub wet_raw: u16,
}

impl Calibration {
    pub fn new(dry_raw: u16, wet_raw: u16) -> Self {
        Self { dry_raw, wet_raw }
    }

    /// Map a raw reading to a moisture percentage
    pub fn percent(&self, raw: u16) -> u8 {
        percent(raw, self.dry_raw, self.wet_raw)
    }
}

/// Map a raw ADC reading to 0-100 %
///
/// Formula: (dry - raw) * 100 / (dry - wet), clamped and truncated.
/// Returns 0 if dry == wet (degenerate calibration).
pub fn percent(raw: u16, dry_raw: u16, wet_raw: u16) -> u8 {
    if dry_raw == wet_raw {
        return 0;
    }

    let numerator = (i64::from(dry_raw) - i64::from(raw)) * 100;
    let denominator = i64::from(dry_raw) - i64::from(wet_raw);

    (numerator / denominator).clamp(0, 100) as u8
}
