//! Simulator configuration.

use crate::bus::QosLevel;
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a simulator run. Read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// MQTT broker host
    pub host: String,
    /// MQTT broker port
    pub port: u16,
    /// Keepalive interval in seconds
    pub keepalive_secs: u64,
    /// MQTT client identifier
    pub client_id: String,
    /// Seconds between publish cycles
    pub interval_secs: f64,
    /// Mean of the temperature sensor in °C
    pub temp_center: f64,
    /// Delivery quality for sensor messages
    pub qos: QosLevel,
    /// Path of the NDJSON record log
    pub log_file: PathBuf,
    /// Stop after this many cycles (unbounded when `None`)
    pub max_cycles: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: crate::DEFAULT_BROKER_PORT,
            keepalive_secs: crate::DEFAULT_KEEPALIVE_SECS,
            client_id: generate_client_id(),
            interval_secs: crate::DEFAULT_INTERVAL_SECS,
            temp_center: crate::sensors::temperature::DEFAULT_CENTER_C,
            qos: QosLevel::AtMostOnce,
            log_file: PathBuf::from(crate::DEFAULT_LOG_FILE),
            max_cycles: None,
        }
    }
}

impl SimulatorConfig {
    /// Create a configuration targeting the given broker.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_keepalive_secs(mut self, secs: u64) -> Self {
        self.keepalive_secs = secs;
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_interval_secs(mut self, secs: f64) -> Self {
        self.interval_secs = secs;
        self
    }

    pub fn with_temp_center(mut self, center: f64) -> Self {
        self.temp_center = center;
        self
    }

    pub fn with_qos(mut self, qos: QosLevel) -> Self {
        self.qos = qos;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    pub fn with_max_cycles(mut self, cycles: Option<u64>) -> Self {
        self.max_cycles = cycles;
        self
    }

    /// Broker address as `host:port`.
    pub fn broker_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Publish interval as a `Duration`. Zero, negative and non-finite
    /// intervals are rejected.
    pub fn interval(&self) -> Result<Duration> {
        if !(self.interval_secs.is_finite() && self.interval_secs > 0.0) {
            return Err(SimError::config_error(format!(
                "interval must be a positive number of seconds, got {}",
                self.interval_secs
            )));
        }
        Duration::try_from_secs_f64(self.interval_secs)
            .map_err(|e| SimError::config_error(format!("interval {}: {}", self.interval_secs, e)))
    }

    /// Check values that would otherwise fail deep inside the run.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(SimError::config_error("broker host must not be empty"));
        }
        if self.client_id.is_empty() {
            return Err(SimError::config_error("client id must not be empty"));
        }
        self.interval()?;
        if !self.temp_center.is_finite() {
            return Err(SimError::config_error(format!(
                "temperature center must be finite, got {}",
                self.temp_center
            )));
        }
        if self.keepalive_secs == 0 {
            return Err(SimError::config_error("keepalive must be at least one second"));
        }
        Ok(())
    }
}

/// Fresh client id of the form `iot-sim-<uuid>`.
pub fn generate_client_id() -> String {
    format!("iot-sim-{}", uuid::Uuid::new_v4().simple())
}
