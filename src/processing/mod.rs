pub mod calibration;
pub mod sampling;
