use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod api;
mod config;
mod error;
mod hardware;
mod network;
mod processing;
mod protocol;
mod service;

use api::{PageInfo, RouteTable};
use config::{Cli, Profile};
use hardware::AnalogSensor;
use hardware::serial::SerialSensor;
use processing::sampling::Sampler;
use service::actuator::PumpDriver;
use service::auto::AutoController;
use service::server::{ConnectionHandler, ControlServer, DEFAULT_READ_TIMEOUT};
use service::{Controller, Scheduler};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with colors and stderr output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "irrigation_service=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Handle --list-ports
    if cli.list_ports {
        list_serial_ports();
        return Ok(());
    }

    // Require a sensor mode if not listing ports
    let Some(sensor_config) = cli.to_sensor_config() else {
        eprintln!("Error: Please specify a sensor mode (serial, playback or simulate)");
        eprintln!("Use --help for usage information");
        std::process::exit(1);
    };

    let sensor = sensor_config.create_sensor()?;

    if cli.calibrate {
        calibrate(sensor).await;
        return Ok(());
    }

    // Bring up the network before anything listens
    let link = cli.to_network_config().create_link();
    let ip = link.bring_up().await?;
    tracing::info!("Network up in {} mode, IP {}", link.mode(), ip);

    // Actuator, forced off before the server accepts anything
    let relay_config = cli.relay_output();
    let indicator = match cli.indicator_output() {
        Some(config) => Some(config.create_output()?),
        None => None,
    };
    let pump = PumpDriver::new(relay_config.create_output()?, indicator, cli.active_low);

    let sensor_label = format!("{} pin {}", sensor.name(), cli.sensor_pin);
    let sampler = Sampler::new(sensor, usize::from(cli.samples), cli.sample_delay());

    let settings = cli.to_settings();
    tracing::info!(
        "Calibration dry={} wet={}, threshold {}%, water {} s, auto {}",
        settings.calibration.dry_raw,
        settings.calibration.wet_raw,
        settings.threshold_percent,
        settings.water_seconds,
        settings.auto_mode
    );
    let controller = Controller::new(settings, pump, sampler);

    let routes = match cli.profile {
        Profile::Station => RouteTable::standard(),
        Profile::AccessPoint => RouteTable::access_point(),
    };
    let page = PageInfo {
        ip: ip.to_string(),
        relay: relay_config.label(),
        sensor: sensor_label,
    };
    let handler = ConnectionHandler::new(routes, page, DEFAULT_READ_TIMEOUT);

    let addr = SocketAddr::new(cli.host, cli.listen);
    let server = ControlServer::bind(addr, cli.accept_timeout(), handler)?;
    let bound = server.local_addr()?;
    tracing::info!("HTTP server listening on {} (http://{}:{})", bound, ip, bound.port());

    let auto = AutoController::new(cli.eval_interval(), cli.hold_poll());
    let mut scheduler = Scheduler::new(controller, auto, server);

    scheduler.run_until(shutdown_signal()).await;

    tracing::info!("Shutting down...");

    Ok(())
}

/// Stream single raw readings so the dry and wet anchors can be measured
async fn calibrate(mut sensor: Box<dyn AnalogSensor>) {
    tracing::info!("Calibration mode on {}, Ctrl+C to stop", sensor.name());

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let now = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S");
                println!("{} {}", now, sensor.read_raw());
            }
        }
    }
}

/// List available serial ports
fn list_serial_ports() {
    match SerialSensor::list_available_ports() {
        Ok(ports) => {
            if ports.is_empty() {
                println!("No serial ports found");
            } else {
                println!("Available serial ports:");
                for port in ports {
                    let port_type = match port.port_type {
                        serialport::SerialPortType::UsbPort(info) => {
                            format!(
                                "USB - {}",
                                info.product.unwrap_or_else(|| "Unknown".to_string())
                            )
                        }
                        serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                        serialport::SerialPortType::PciPort => "PCI".to_string(),
                        serialport::SerialPortType::Unknown => "Unknown".to_string(),
                    };
                    println!("  {} - {}", port.port_name, port_type);
                }
            }
        }
        Err(e) => {
            eprintln!("Error listing serial ports: {}", e);
        }
    }
}

/// Wait for shutdown signal (Ctrl+C)
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
