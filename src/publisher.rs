//! The read → log → publish → wait cycle.
//!
//! A [`PublishLoop`] owns the sensors, the record log and the bus client and
//! drives them from a single task. Cancellation is cooperative: the token is
//! checked before each cycle and while waiting between cycles, never in the
//! middle of one.

use crate::bus::{Bus, QosLevel};
use crate::config::SimulatorConfig;
use crate::error::{Result, SimError};
use crate::sensors::Sensor;
use crate::storage::RecordLog;
use serde::Serialize;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lifecycle of a publish loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopState {
    Idle,
    Connected,
    Running,
    Stopping,
    Terminated,
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    /// Completed cycles
    pub cycles: u64,
    /// Records appended to the log
    pub records_logged: u64,
    /// Messages accepted by the bus
    pub published: u64,
    /// Messages the bus refused (dropped, not retried)
    pub publish_failures: u64,
}

/// Timing and delivery settings for a loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub interval: Duration,
    pub qos: QosLevel,
    pub max_cycles: Option<u64>,
}

impl LoopSettings {
    pub fn new(interval: Duration, qos: QosLevel) -> Self {
        Self {
            interval,
            qos,
            max_cycles: None,
        }
    }

    pub fn with_max_cycles(mut self, cycles: Option<u64>) -> Self {
        self.max_cycles = cycles;
        self
    }
}

impl TryFrom<&SimulatorConfig> for LoopSettings {
    type Error = SimError;

    fn try_from(config: &SimulatorConfig) -> Result<Self> {
        Ok(Self::new(config.interval()?, config.qos).with_max_cycles(config.max_cycles))
    }
}

/// Drives sensors, a record log and a bus at a fixed interval.
pub struct PublishLoop<L, B> {
    sensors: Vec<Box<dyn Sensor>>,
    log: L,
    bus: B,
    settings: LoopSettings,
    state: LoopState,
    stats: LoopStats,
}

impl<L: RecordLog, B: Bus> PublishLoop<L, B> {
    /// Sensors are read in the order given.
    pub fn new(sensors: Vec<Box<dyn Sensor>>, log: L, bus: B, settings: LoopSettings) -> Self {
        Self {
            sensors,
            log,
            bus,
            settings,
            state: LoopState::Idle,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// `Idle → Connected`. A failure leaves the loop idle.
    pub async fn connect(&mut self) -> Result<()> {
        if self.state != LoopState::Idle {
            return Ok(());
        }
        self.bus.connect().await?;
        self.state = LoopState::Connected;
        Ok(())
    }

    /// Run one read → log → publish pass over every sensor.
    ///
    /// Publish failures are reported and counted; a log failure aborts the
    /// cycle and is returned.
    pub async fn run_cycle(&mut self) -> Result<()> {
        let qos = self.settings.qos;

        for sensor in self.sensors.iter_mut() {
            let record = sensor.read();

            if let Err(e) = self.log.append(&record) {
                error!("Failed to write {} record to log: {}", record.sensor, e);
                return Err(e);
            }
            self.stats.records_logged += 1;

            let topic = sensor.topic();
            let payload = record.to_json()?;
            match self.bus.publish(topic, &payload, qos, false).await {
                Ok(()) => {
                    self.stats.published += 1;
                    debug!("Published to {}: {}", topic, payload);
                }
                Err(e) => {
                    self.stats.publish_failures += 1;
                    error!("Publish failed: {}", e);
                }
            }
        }

        self.stats.cycles += 1;
        Ok(())
    }

    /// Connect, cycle until cancelled (or the cycle cap is hit), then
    /// release the bus and the log.
    ///
    /// Both releases are attempted regardless of how the loop ended. A
    /// connection or log failure is returned after they run.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<LoopStats> {
        if let Err(e) = self.connect().await {
            error!("Could not connect to bus: {}", e);
            if let Err(close_err) = self.log.close() {
                warn!("Error while closing record log: {}", close_err);
            }
            self.state = LoopState::Terminated;
            return Err(e);
        }

        self.state = LoopState::Running;
        info!(
            "Publishing {} sensors every {:?} at QoS {}",
            self.sensors.len(),
            self.settings.interval,
            self.settings.qos
        );

        let outcome = self.cycle_until_stopped(&cancel).await;

        self.state = LoopState::Stopping;
        self.shutdown().await;
        self.state = LoopState::Terminated;

        outcome.map(|()| self.stats)
    }

    async fn cycle_until_stopped(&mut self, cancel: &CancellationToken) -> Result<()> {
        loop {
            if cancel.is_cancelled() {
                info!("Shutdown requested");
                return Ok(());
            }

            self.run_cycle().await?;

            if let Some(max) = self.settings.max_cycles {
                if self.stats.cycles >= max {
                    info!("Completed {} cycles", self.stats.cycles);
                    return Ok(());
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown requested");
                    return Ok(());
                }
                _ = time::sleep(self.settings.interval) => {}
            }
        }
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.bus.disconnect().await {
            warn!("Error while disconnecting from bus: {}", e);
        }
        if let Err(e) = self.log.close() {
            warn!("Error while closing record log: {}", e);
        }
    }
}
