//! # iBUS Telemetry
//!
//! Serve sensor telemetry to a FlySky receiver over its iBUS sensor port.
//!
//! Usage: `ibus-telemetry [CONFIG]` (defaults to `config/default.toml`).

use anyhow::{Context, Result};
use tokio::time::{interval, sleep, Duration, Instant, MissedTickBehavior};
use tracing::info;

use ibus_telemetry::config::Config;
use ibus_telemetry::ibus::engine::ProtocolEngine;
use ibus_telemetry::ibus::registry::Registration;
use ibus_telemetry::serial::IbusSerial;

/// Config file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the iBUS telemetry responder
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration and open the sensor port
///    - Let the line settle, then register the configured sensors
///
/// 2. **Main Loop**
///    - Poll the protocol engine every `poll_interval_us`
///    - Log counters every `status_interval_s`
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration is invalid or the serial port cannot be
/// opened. Nothing in the main loop is fatal.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("iBUS telemetry v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let serial = IbusSerial::open(&config.serial)?;

    // Boot-time line noise is dropped when the engine takes the port
    sleep(Duration::from_millis(config.serial.settle_ms)).await;
    let mut engine = ProtocolEngine::new(serial);
    engine.set_verbose(config.engine.verbose);

    for sensor in &config.sensors {
        if let Registration::Added { address } = engine.set_sensor(sensor.kind, sensor.value) {
            info!("Serving {:?} = {} at address {}", sensor.kind, sensor.value, address);
        }
    }

    let mut poll_interval = interval(Duration::from_micros(config.engine.poll_interval_us));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let status_period = Duration::from_secs(config.engine.status_interval_s);
    let mut last_status = Instant::now();

    info!(
        "Polling {} every {}us",
        engine.transport().device_path(),
        config.engine.poll_interval_us
    );
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                engine.poll();

                if last_status.elapsed() >= status_period {
                    let stats = engine.stats();
                    info!(
                        "Frames received: {}, responses sent: {}, discovered: {}",
                        stats.frames_received, stats.responses_sent, stats.discovered
                    );
                    last_status = Instant::now();
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Final stats: {:?}", engine.stats());
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::load(DEFAULT_CONFIG_PATH).unwrap();
        assert!(config.sensors.len() <= ibus_telemetry::ibus::protocol::MAX_SENSORS);
        assert_eq!(config.serial.baud_rate, ibus_telemetry::ibus::protocol::IBUS_BAUD_RATE);
    }
}
