//! # IoT Sensor Simulator
//!
//! Synthetic temperature, humidity and GPS sensors whose readings are
//! appended to a newline-delimited JSON log and published over MQTT at a
//! fixed interval.
//!
//! ## Features
//!
//! - **Sensor models**: Gaussian temperature, bounded random-walk humidity,
//!   random-walk GPS position
//! - **Durable log**: one JSON record per line, flushed after every write
//! - **MQTT publishing**: per-sensor topics, configurable QoS, retained
//!   online/offline status with a last will
//! - **Library + Binary**: Use as a crate or standalone application
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use iot_sensor_sim::{
//!     sensors, LoopSettings, MqttBus, NdjsonLog, PublishLoop, SimulatorConfig,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SimulatorConfig::default();
//!     let publisher = PublishLoop::new(
//!         sensors::standard_suite(&config)?,
//!         NdjsonLog::open(&config.log_file)?,
//!         MqttBus::from_config(&config),
//!         LoopSettings::try_from(&config)?,
//!     );
//!
//!     let stats = publisher.run(CancellationToken::new()).await?;
//!     println!("{} cycles", stats.cycles);
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod publisher;
pub mod sensors;
pub mod storage;

// Re-export public API
pub use bus::{Bus, BusEvent, MqttBus, QosLevel};
pub use config::SimulatorConfig;
pub use error::{Result, SimError};
pub use publisher::{LoopSettings, LoopState, LoopStats, PublishLoop};
pub use sensors::{
    GpsSensor, HumiditySensor, Payload, ReadingRecord, Sensor, SensorKind, TemperatureSensor,
};
pub use storage::{MemoryLog, NdjsonLog, RecordLog};

/// The default publish interval in seconds
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;

/// The default MQTT broker port
pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// The default MQTT keepalive in seconds
pub const DEFAULT_KEEPALIVE_SECS: u64 = 60;

/// The default record log path
pub const DEFAULT_LOG_FILE: &str = "data.json";
