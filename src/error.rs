use thiserror::Error;

/// Main error type for the irrigation service
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    #[error("GPIO error: {0}")]
    Gpio(#[from] sysfs_gpio::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network bring-up error: {0}")]
    Network(String),

    #[error("Sensor bridge error: {0}")]
    Sensor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: ControllerError = io_err.into();
        assert!(matches!(err, ControllerError::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ControllerError::Config("samples must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: samples must be at least 1"
        );
    }

    #[test]
    fn test_sensor_error_display() {
        let err = ControllerError::Sensor("no integer in reply \"ERR\"".to_string());
        assert!(err.to_string().starts_with("Sensor bridge error"));
    }
}
