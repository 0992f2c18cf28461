use std::time::Duration;

use crate::api::models::StatusSnapshot;
use crate::api::page::{self, PageInfo, PageView};
use crate::api::routes::Route;
use crate::protocol::Response;
use crate::service::state::Controller;

/// Apply a route's effect to the controller and build its response
pub async fn handle(route: Route, ctl: &mut Controller, info: &PageInfo) -> Response {
    match route {
        Route::Root | Route::Fallback => {}
        Route::PumpOn => ctl.pump.set_pump(true),
        Route::PumpOff => ctl.pump.set_pump(false),
        Route::AutoOn => set_auto(ctl, true),
        Route::AutoOff => set_auto(ctl, false),
        Route::WaterOnce { seconds } => water_once(ctl, seconds).await,
        Route::SetThreshold { value } => set_threshold(ctl, value),
        Route::Status => return status(ctl).await,
        Route::Favicon => return Response::NotFound,
    }

    status_page(ctl, info).await
}

fn set_auto(ctl: &mut Controller, enabled: bool) {
    ctl.settings.auto_mode = enabled;
    tracing::info!("Auto mode {}", if enabled { "enabled" } else { "disabled" });
}

/// GET /water_once?s=N - blocking manual watering
///
/// The clamped duration becomes the new default before the pump starts.
async fn water_once(ctl: &mut Controller, seconds: Option<i64>) {
    let requested = seconds.unwrap_or(i64::from(ctl.settings.water_seconds));
    let seconds = ctl.settings.set_water_seconds(requested);

    tracing::info!("Manual watering for {} s", seconds);

    let hold = Duration::from_secs(u64::from(seconds));
    ctl.water_for(hold, hold).await;
}

/// GET /set_threshold?v=N - a missing value leaves the threshold alone
fn set_threshold(ctl: &mut Controller, value: Option<i64>) {
    if let Some(value) = value {
        let stored = ctl.settings.set_threshold(value);
        tracing::info!("Threshold set to {}%", stored);
    }
}

/// GET /status - JSON snapshot with a fresh moisture sample
async fn status(ctl: &mut Controller) -> Response {
    let moisture = ctl.moisture_percent().await;
    let snapshot = StatusSnapshot {
        pump: ctl.pump.is_on(),
        moisture,
        threshold: ctl.settings.threshold_percent,
        auto: ctl.settings.auto_mode,
    };
    Response::Json(snapshot.to_json())
}

async fn status_page(ctl: &mut Controller, info: &PageInfo) -> Response {
    let moisture = ctl.moisture_percent().await;
    let view = PageView {
        pump_on: ctl.pump.is_on(),
        moisture,
        auto_mode: ctl.settings.auto_mode,
        threshold: ctl.settings.threshold_percent,
        water_seconds: ctl.settings.water_seconds,
    };
    Response::Html(page::render(&view, info))
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;
    use crate::hardware::Level;
    use crate::hardware::sim::{SimulatedOutput, SimulatedSensor};
    use crate::processing::calibration::Calibration;
    use crate::processing::sampling::{DEFAULT_SAMPLE_DELAY, Sampler};
    use crate::service::actuator::PumpDriver;
    use crate::service::state::Settings;

    struct Fixture {
        ctl: Controller,
        sensor: SimulatedSensor,
        relay: SimulatedOutput,
        led: SimulatedOutput,
        info: PageInfo,
    }

    fn fixture() -> Fixture {
        let sensor = SimulatedSensor::new(31_750);
        let relay = SimulatedOutput::new("relay");
        let led = SimulatedOutput::new("led");
        let pump = PumpDriver::new(
            Box::new(relay.clone()),
            Some(Box::new(led.clone())),
            false,
        );
        let sampler = Sampler::new(Box::new(sensor.clone()), 16, DEFAULT_SAMPLE_DELAY);
        let settings = Settings {
            calibration: Calibration::new(44_000, 19_500),
            ..Settings::default()
        };
        Fixture {
            ctl: Controller::new(settings, pump, sampler),
            sensor,
            relay,
            led,
            info: PageInfo {
                ip: "127.0.0.1".into(),
                relay: "relay".into(),
                sensor: "simulated".into(),
            },
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pump_on_off() {
        let mut f = fixture();

        let response = handle(Route::PumpOn, &mut f.ctl, &f.info).await;
        assert!(f.ctl.pump.is_on());
        assert!(matches!(response, Response::Html(ref page) if page.contains("action=\"/off\"")));

        handle(Route::PumpOff, &mut f.ctl, &f.info).await;
        assert!(!f.ctl.pump.is_on());
        assert_eq!(f.relay.last_level(), Some(Level::Low));
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_on_is_idempotent() {
        let mut f = fixture();

        for _ in 0..3 {
            handle(Route::PumpOn, &mut f.ctl, &f.info).await;
        }

        assert!(f.ctl.pump.is_on());
        assert_eq!(f.led.transitions(), 1);
        assert_eq!(f.led.last_level(), Some(Level::High));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_toggle() {
        let mut f = fixture();

        handle(Route::AutoOn, &mut f.ctl, &f.info).await;
        assert!(f.ctl.settings.auto_mode);

        handle(Route::AutoOff, &mut f.ctl, &f.info).await;
        assert!(!f.ctl.settings.auto_mode);
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_clamped() {
        let mut f = fixture();

        handle(Route::SetThreshold { value: Some(150) }, &mut f.ctl, &f.info).await;
        assert_eq!(f.ctl.settings.threshold_percent, 100);

        handle(Route::SetThreshold { value: Some(-5) }, &mut f.ctl, &f.info).await;
        assert_eq!(f.ctl.settings.threshold_percent, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_missing_value_unchanged() {
        let mut f = fixture();
        f.ctl.settings.threshold_percent = 42;

        handle(Route::SetThreshold { value: None }, &mut f.ctl, &f.info).await;
        assert_eq!(f.ctl.settings.threshold_percent, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_water_once_clamps_and_persists() {
        let mut f = fixture();

        let start = Instant::now();
        handle(Route::WaterOnce { seconds: Some(45) }, &mut f.ctl, &f.info).await;
        assert_eq!(f.ctl.settings.water_seconds, 30);
        assert!(start.elapsed() >= Duration::from_secs(30));
        assert!(!f.ctl.pump.is_on());
        assert_eq!(f.relay.transitions(), 2);

        let start = Instant::now();
        handle(Route::WaterOnce { seconds: Some(0) }, &mut f.ctl, &f.info).await;
        assert_eq!(f.ctl.settings.water_seconds, 1);
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_values_clamp_to_limits() {
        let mut f = fixture();
        let table = crate::api::RouteTable::standard();

        let route = table.resolve(b"/set_threshold?v=99999999999999999999999");
        handle(route, &mut f.ctl, &f.info).await;
        assert_eq!(f.ctl.settings.threshold_percent, 100);

        let route = table.resolve(b"/water_once?s=99999999999999999999999");
        let start = Instant::now();
        handle(route, &mut f.ctl, &f.info).await;
        assert_eq!(f.ctl.settings.water_seconds, 30);
        assert!(start.elapsed() >= Duration::from_secs(30));
        assert!(!f.ctl.pump.is_on());
    }

    #[tokio::test(start_paused = true)]
    async fn test_water_once_default_duration() {
        let mut f = fixture();
        f.ctl.settings.water_seconds = 6;

        let start = Instant::now();
        let response = handle(Route::WaterOnce { seconds: None }, &mut f.ctl, &f.info).await;

        assert_eq!(f.ctl.settings.water_seconds, 6);
        assert!(start.elapsed() >= Duration::from_secs(6));
        assert!(matches!(response, Response::Html(ref page) if page.contains("value=\"6\"")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_json_is_fresh() {
        let mut f = fixture();

        let first = handle(Route::Status, &mut f.ctl, &f.info).await;
        assert_eq!(
            first,
            Response::Json(r#"{"pump":false,"moisture":50,"threshold":35,"auto":false}"#.into())
        );

        f.sensor.set_raw(19_500);
        f.ctl.pump.set_pump(true);
        let second = handle(Route::Status, &mut f.ctl, &f.info).await;
        assert_eq!(
            second,
            Response::Json(r#"{"pump":true,"moisture":100,"threshold":35,"auto":false}"#.into())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_favicon_not_found_without_sampling() {
        let mut f = fixture();

        let response = handle(Route::Favicon, &mut f.ctl, &f.info).await;
        assert_eq!(response, Response::NotFound);
        assert_eq!(f.sensor.reads(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_renders_live_page() {
        let mut f = fixture();
        f.ctl.settings.auto_mode = true;

        let response = handle(Route::Fallback, &mut f.ctl, &f.info).await;
        let Response::Html(page) = response else {
            panic!("Expected status page");
        };
        assert!(page.contains(">50%</b>"));
        assert!(page.contains("action=\"/auto_off\""));
        assert_eq!(f.sensor.reads(), 16);
    }
}
