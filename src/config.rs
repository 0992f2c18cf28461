use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::hardware::{OutputConfig, SensorConfig};
use crate::network::{DEFAULT_AP_ADDRESS, NetworkConfig, STATION_CONNECT_TIMEOUT};
use crate::processing::calibration::Calibration;
use crate::processing::sampling::{DEFAULT_SAMPLE_DELAY, DEFAULT_SAMPLES};
use crate::service::Settings;
use crate::service::server::DEFAULT_ACCEPT_TIMEOUT;

#[derive(Parser, Debug)]
#[command(name = "irrigation-service")]
#[command(about = "Soil-moisture irrigation controller with a minimal HTTP control surface")]
#[command(version)]
pub struct Cli {
    /// Deployment profile: network mode plus its cadence and calibration defaults
    #[arg(long, value_enum, env = "IRRIGATION_PROFILE", default_value = "station")]
    pub profile: Profile,

    /// Network name to join (station) or to host (access-point)
    #[arg(long, env = "WIFI_SSID", default_value = "")]
    pub ssid: String,

    /// Access point passphrase
    #[arg(long, env = "WIFI_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Gateway address in access-point mode
    #[arg(long, env = "IRRIGATION_AP_ADDRESS", default_value_t = DEFAULT_AP_ADDRESS)]
    pub ap_address: IpAddr,

    /// HTTP server port
    #[arg(short, long, env = "IRRIGATION_PORT", default_value = "80")]
    pub listen: u16,

    /// HTTP server host
    #[arg(long, env = "IRRIGATION_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Relay GPIO line (sysfs number); simulated when absent
    #[arg(long, env = "IRRIGATION_RELAY_PIN")]
    pub relay_pin: Option<u64>,

    /// Relay energises on a low level
    #[arg(long, env = "IRRIGATION_ACTIVE_LOW")]
    pub active_low: bool,

    /// Status LED GPIO line (sysfs number); no indicator when absent
    #[arg(long, env = "IRRIGATION_LED_PIN")]
    pub led_pin: Option<u64>,

    /// Analog input the moisture probe is wired to
    #[arg(long, env = "IRRIGATION_SENSOR_PIN", default_value = "26")]
    pub sensor_pin: u8,

    /// Raw reads averaged per sample
    #[arg(long, env = "IRRIGATION_SAMPLES", default_value_t = DEFAULT_SAMPLES,
          value_parser = clap::value_parser!(u16).range(1..))]
    pub samples: u16,

    /// Settling delay after each raw read, in milliseconds
    #[arg(long, env = "IRRIGATION_SAMPLE_DELAY_MS",
          default_value_t = DEFAULT_SAMPLE_DELAY.as_millis() as u64)]
    pub sample_delay_ms: u64,

    /// Raw reading of bone-dry soil (0 %) [default: from profile]
    #[arg(long, env = "IRRIGATION_DRY_RAW")]
    pub dry_raw: Option<u16>,

    /// Raw reading of saturated soil (100 %) [default: from profile]
    #[arg(long, env = "IRRIGATION_WET_RAW")]
    pub wet_raw: Option<u16>,

    /// Moisture percentage below which automatic watering starts
    #[arg(long, env = "IRRIGATION_THRESHOLD", default_value = "35",
          value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: u8,

    /// Length of a watering cycle in seconds [default: from profile]
    #[arg(long, env = "IRRIGATION_WATER_SECONDS",
          value_parser = clap::value_parser!(u8).range(1..=30))]
    pub water_seconds: Option<u8>,

    /// Start with automatic watering enabled
    #[arg(long, env = "IRRIGATION_AUTO")]
    pub auto: bool,

    /// Minimum time between automatic evaluations, in milliseconds [default: from profile]
    #[arg(long, env = "IRRIGATION_EVAL_INTERVAL_MS")]
    pub eval_interval_ms: Option<u64>,

    /// Polling step during an automatic watering hold, in milliseconds [default: from profile]
    #[arg(long, env = "IRRIGATION_HOLD_POLL_MS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub hold_poll_ms: Option<u64>,

    /// How long each loop iteration waits for a connection, in milliseconds
    #[arg(long, env = "IRRIGATION_ACCEPT_TIMEOUT_MS",
          default_value_t = DEFAULT_ACCEPT_TIMEOUT.as_millis() as u64)]
    pub accept_timeout_ms: u64,

    /// List available serial ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Print one raw reading per second instead of running the controller
    #[arg(long)]
    pub calibrate: bool,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Mode {
    /// Read the probe through a serial ADC bridge
    Serial(SerialArgs),

    /// Replay raw readings from a file
    Playback(PlaybackArgs),

    /// Use a fixed raw reading
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SerialArgs {
    /// Serial port device path (e.g., COM3 on Windows, /dev/ttyACM0 on Linux)
    #[arg(short, long)]
    pub device: String,

    /// Baud rate
    #[arg(short, long, default_value = "115200")]
    pub baud: u32,
}

#[derive(Args, Debug, Clone)]
pub struct PlaybackArgs {
    /// File with one raw reading per line
    #[arg(short, long)]
    pub file: PathBuf,

    /// Start over when the file ends
    #[arg(long, default_value = "false")]
    pub loop_playback: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Raw reading returned on every read
    #[arg(long, default_value = "40000")]
    pub raw: u16,
}

/// Deployment profile
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    /// Join an existing network
    #[default]
    Station,
    /// Host a network; serves `/` exactly and 404s `/favicon.ico`
    AccessPoint,
}

/// Values the two deployments differ in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileDefaults {
    pub calibration: Calibration,
    pub water_seconds: u8,
    pub eval_interval: Duration,
    pub hold_poll: Duration,
}

impl Profile {
    pub fn defaults(&self) -> ProfileDefaults {
        match self {
            Profile::Station => ProfileDefaults {
                calibration: Calibration::new(60_000, 25_000),
                water_seconds: 4,
                eval_interval: Duration::from_secs(1),
                hold_poll: Duration::from_millis(50),
            },
            Profile::AccessPoint => ProfileDefaults {
                calibration: Calibration::new(44_000, 19_500),
                water_seconds: 1,
                eval_interval: Duration::from_secs(7),
                hold_poll: Duration::from_secs(1),
            },
        }
    }
}

impl Cli {
    /// Convert CLI args to SensorConfig
    pub fn to_sensor_config(&self) -> Option<SensorConfig> {
        match &self.mode {
            Some(Mode::Serial(args)) => Some(SensorConfig::Serial {
                port: args.device.clone(),
                baud_rate: args.baud,
                pin: self.sensor_pin,
            }),
            Some(Mode::Playback(args)) => Some(SensorConfig::Playback {
                file: args.file.clone(),
                loop_playback: args.loop_playback,
            }),
            Some(Mode::Simulate(args)) => Some(SensorConfig::Simulated { raw: args.raw }),
            None => None,
        }
    }

    pub fn relay_output(&self) -> OutputConfig {
        match self.relay_pin {
            Some(pin) => OutputConfig::Gpio { pin },
            None => OutputConfig::Simulated {
                name: "relay".to_string(),
            },
        }
    }

    pub fn indicator_output(&self) -> Option<OutputConfig> {
        self.led_pin.map(|pin| OutputConfig::Gpio { pin })
    }

    pub fn to_network_config(&self) -> NetworkConfig {
        match self.profile {
            Profile::Station => NetworkConfig::Station {
                ssid: self.ssid.clone(),
                connect_timeout: STATION_CONNECT_TIMEOUT,
            },
            Profile::AccessPoint => NetworkConfig::AccessPoint {
                ssid: self.ssid.clone(),
                password: self.password.clone(),
                address: self.ap_address,
            },
        }
    }

    /// Initial runtime settings, profile defaults filled in
    pub fn to_settings(&self) -> Settings {
        let defaults = self.profile.defaults();
        Settings {
            calibration: Calibration::new(
                self.dry_raw.unwrap_or(defaults.calibration.dry_raw),
                self.wet_raw.unwrap_or(defaults.calibration.wet_raw),
            ),
            threshold_percent: self.threshold,
            water_seconds: self.water_seconds.unwrap_or(defaults.water_seconds),
            auto_mode: self.auto,
        }
    }

    pub fn eval_interval(&self) -> Duration {
        self.eval_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(self.profile.defaults().eval_interval)
    }

    pub fn hold_poll(&self) -> Duration {
        self.hold_poll_ms
            .map(Duration::from_millis)
            .unwrap_or(self.profile.defaults().hold_poll)
    }

    pub fn sample_delay(&self) -> Duration {
        Duration::from_millis(self.sample_delay_ms)
    }

    pub fn accept_timeout(&self) -> Duration {
        Duration::from_millis(self.accept_timeout_ms)
    }
}
