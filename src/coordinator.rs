//! Polling coordinator for the EO Mini charger
//!
//! The coordinator owns the fetch cadence and the latest snapshot. Each poll
//! cycle fetches the live session document from the EO cloud, stores the
//! parsed snapshot, and synchronously notifies every registered sensor.
//! Updates are serialized by the single polling task; sensors never see
//! concurrent notifications.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, interval};

use crate::cloud::CloudSession;
use crate::config::Config;
use crate::error::Result;
use crate::logging::{LogContext, StructuredLogger, get_logger, get_logger_with_context};
use crate::sensor::ChargerSensor;
use crate::snapshot::LiveSnapshot;

/// Polling coordinator driving the registered sensor entities
pub struct ChargerCoordinator {
    /// Configuration
    config: Config,

    /// Cloud transport
    cloud: Box<dyn CloudSession>,

    /// Charger serial, discovered during initialization
    serial: Option<String>,

    /// Latest snapshot, `None` before the first successful poll
    data_tx: watch::Sender<Option<Arc<LiveSnapshot>>>,

    /// Registered sensors, notified in registration order
    sensors: Vec<Box<dyn ChargerSensor>>,

    /// Shutdown signal
    shutdown_tx: mpsc::UnboundedSender<()>,

    /// Shutdown receiver
    shutdown_rx: mpsc::UnboundedReceiver<()>,

    /// Completed poll cycles
    total_polls: u64,

    /// Logger with context
    logger: StructuredLogger,
}

impl ChargerCoordinator {
    /// Create a new coordinator over the given cloud transport
    pub fn new(config: Config, cloud: Box<dyn CloudSession>) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        let (data_tx, _) = watch::channel(None);

        Self {
            config,
            cloud,
            serial: None,
            data_tx,
            sensors: Vec::new(),
            shutdown_tx,
            shutdown_rx,
            total_polls: 0,
            logger: get_logger("coordinator"),
        }
    }

    /// Authenticate and discover the charger serial
    pub async fn initialize(&mut self) -> Result<()> {
        self.logger.info("Initializing EO Mini charger coordinator");

        let serial = self.cloud.charger_serial().await?;
        self.logger =
            get_logger_with_context(LogContext::new("coordinator").with_serial(serial.clone()));
        self.logger.info("Connected to EO cloud, monitoring charger");
        self.serial = Some(serial);
        Ok(())
    }

    /// Charger serial, available after [`Self::initialize`]
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Latest snapshot, if any poll has succeeded
    pub fn data(&self) -> Option<Arc<LiveSnapshot>> {
        self.data_tx.borrow().clone()
    }

    /// Subscribe to snapshot updates
    pub fn subscribe_data(&self) -> watch::Receiver<Option<Arc<LiveSnapshot>>> {
        self.data_tx.subscribe()
    }

    /// Register a sensor entity. The sensor receives an immediate update
    /// with whatever data the coordinator currently holds.
    pub fn register_sensor(&mut self, mut sensor: Box<dyn ChargerSensor>) {
        self.logger
            .info(&format!("Registered sensor {}", sensor.unique_id()));
        sensor.handle_coordinator_update(self.data().as_deref());
        self.sensors.push(sensor);
    }

    /// Sender that stops [`Self::run`] when signalled
    pub fn shutdown_handle(&self) -> mpsc::UnboundedSender<()> {
        self.shutdown_tx.clone()
    }

    /// Request shutdown
    pub fn request_shutdown(&self) {
        self.shutdown_tx.send(()).ok();
    }

    /// Run the polling loop until shutdown is requested
    pub async fn run(&mut self) -> Result<()> {
        self.logger.info("Starting charger polling loop");

        let mut poll_interval = interval(Duration::from_millis(self.config.poll_interval_ms));

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    if let Err(e) = self.poll_cycle().await {
                        self.logger.error(&format!("Poll cycle failed: {}", e));
                        // Continue polling even on errors
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }

        self.logger.info("Charger polling loop stopped");
        Ok(())
    }

    /// Single polling cycle: fetch, store, notify
    pub async fn poll_cycle(&mut self) -> Result<()> {
        self.logger.debug("Starting poll cycle");

        let snapshot = match self.cloud.live_snapshot().await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                // Keep the previous snapshot; sensors are only notified on
                // fresh data
                self.logger
                    .warn(&format!("Live session fetch failed: {}", e));
                return Ok(());
            }
        };

        self.data_tx.send_replace(Some(snapshot.clone()));
        self.total_polls += 1;

        for sensor in &mut self.sensors {
            sensor.handle_coordinator_update(Some(snapshot.as_ref()));
        }

        self.logger.debug(&format!(
            "Poll cycle {} completed: ESKWH={:?} ChargingTime={:?} PiTime={:?}",
            self.total_polls, snapshot.eskwh, snapshot.charging_time, snapshot.pi_time
        ));
        Ok(())
    }

    /// Completed poll cycles
    pub fn total_polls(&self) -> u64 {
        self.total_polls
    }
}
