//! Sensor entities for the EO Mini charger
//!
//! Two projectors derive displayed values from the latest polled snapshot:
//! session energy and session charging time. Both follow the same shape: a
//! zero `ESKWH` reading marks a session boundary (value resets, the reset
//! timestamp moves), any other reading recomputes the value from the
//! snapshot, and the updated state is published unconditionally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::logging::{StructuredLogger, get_logger};
use crate::publish::{SensorState, StatePublisher};
use crate::snapshot::LiveSnapshot;

/// Namespace prefixed to entity identifiers
pub const DOMAIN: &str = "eo_mini";

const ICON: &str = "mdi:ev-station";

/// Classification of the quantity a sensor measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    #[serde(rename = "energy")]
    Energy,
    #[serde(rename = "duration")]
    Duration,
}

/// Classification of how a sensor's readings accumulate.
///
/// `Total` marks an amount that can both grow and reset, such as a per
/// session counter; the hosting platform uses it together with the reset
/// timestamp when building long-term statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateClass {
    #[serde(rename = "measurement")]
    Measurement,
    #[serde(rename = "total")]
    Total,
    #[serde(rename = "total_increasing")]
    TotalIncreasing,
}

/// Unit of measurement attached to published states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOfMeasurement {
    #[serde(rename = "Wh")]
    WattHours,
    #[serde(rename = "s")]
    Seconds,
}

/// Descriptive metadata bundle a sensor registers with
#[derive(Debug, Clone)]
pub struct SensorDescription {
    /// Metric key, also the unique-id suffix
    pub key: &'static str,

    /// Display name
    pub name: &'static str,

    /// Suggested display icon
    pub icon: &'static str,

    /// Unit of measurement
    pub unit: UnitOfMeasurement,

    /// Measured quantity classification
    pub device_class: DeviceClass,

    /// Accumulation classification
    pub state_class: StateClass,
}

/// Entity seam the coordinator drives: one call per poll cycle with the
/// latest snapshot, or `None` before the first successful poll.
pub trait ChargerSensor: Send {
    /// Registered metadata bundle
    fn description(&self) -> &SensorDescription;

    /// Stable identifier, `{domain}_charger_{serial}_{metric}`
    fn unique_id(&self) -> &str;

    /// Currently exposed reading
    fn value(&self) -> f64;

    /// Session reset marker, if a boundary has been observed
    fn last_reset(&self) -> Option<DateTime<Utc>>;

    /// Recompute the exposed state from the latest snapshot and publish it
    fn handle_coordinator_update(&mut self, data: Option<&LiveSnapshot>);
}

fn compose_unique_id(serial: &str, key: &str) -> String {
    format!("{}_charger_{}_{}", DOMAIN, serial, key)
}

/// Session energy consumption sensor
pub struct SessionEnergySensor {
    description: SensorDescription,
    unique_id: String,
    value: f64,
    last_reset: Option<DateTime<Utc>>,
    publisher: Arc<dyn StatePublisher>,
    logger: StructuredLogger,
}

impl SessionEnergySensor {
    /// Create the energy sensor for the charger with the given serial
    pub fn new(serial: &str, publisher: Arc<dyn StatePublisher>) -> Self {
        let description = SensorDescription {
            key: "energy",
            name: "Consumption",
            icon: ICON,
            unit: UnitOfMeasurement::WattHours,
            device_class: DeviceClass::Energy,
            state_class: StateClass::Total,
        };
        Self {
            unique_id: compose_unique_id(serial, description.key),
            description,
            value: 0.0,
            last_reset: None,
            publisher,
            logger: get_logger("sensor.energy"),
        }
    }
}

impl ChargerSensor for SessionEnergySensor {
    fn description(&self) -> &SensorDescription {
        &self.description
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn last_reset(&self) -> Option<DateTime<Utc>> {
        self.last_reset
    }

    fn handle_coordinator_update(&mut self, data: Option<&LiveSnapshot>) {
        // No snapshot yet: nothing to do, keep the prior exposed value
        let Some(snapshot) = data else { return };
        let Some(eskwh) = snapshot.eskwh else {
            self.logger.warn("Snapshot missing ESKWH, skipping update");
            return;
        };

        if snapshot.is_session_boundary() {
            self.last_reset = Some(snapshot.reset_timestamp());
            self.value = 0.0;
        } else {
            // ESKWH arrives as kWh per second; dividing by 3600 yields the
            // energy figure. Negative readings are clamped to zero.
            self.value = if eskwh > 0.0 { eskwh / 3600.0 } else { 0.0 };
        }
        publish_state(
            &*self.publisher,
            &self.logger,
            &self.description,
            &self.unique_id,
            self.value,
            self.last_reset,
        );
    }
}

/// Session charging time sensor
pub struct SessionChargingTimeSensor {
    description: SensorDescription,
    unique_id: String,
    value: f64,
    last_reset: Option<DateTime<Utc>>,
    publisher: Arc<dyn StatePublisher>,
    logger: StructuredLogger,
}

impl SessionChargingTimeSensor {
    /// Create the charging time sensor for the charger with the given serial
    pub fn new(serial: &str, publisher: Arc<dyn StatePublisher>) -> Self {
        let description = SensorDescription {
            key: "charging_time",
            name: "Charging Time",
            icon: ICON,
            unit: UnitOfMeasurement::Seconds,
            device_class: DeviceClass::Duration,
            state_class: StateClass::Total,
        };
        Self {
            unique_id: compose_unique_id(serial, description.key),
            description,
            value: 0.0,
            last_reset: None,
            publisher,
            logger: get_logger("sensor.charging_time"),
        }
    }
}

impl ChargerSensor for SessionChargingTimeSensor {
    fn description(&self) -> &SensorDescription {
        &self.description
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn last_reset(&self) -> Option<DateTime<Utc>> {
        self.last_reset
    }

    fn handle_coordinator_update(&mut self, data: Option<&LiveSnapshot>) {
        let Some(snapshot) = data else { return };
        if snapshot.eskwh.is_none() {
            self.logger.warn("Snapshot missing ESKWH, skipping update");
            return;
        }

        if snapshot.is_session_boundary() {
            self.last_reset = Some(snapshot.reset_timestamp());
            self.value = 0.0;
        } else {
            self.value = snapshot.charging_time.unwrap_or(0) as f64;
        }
        publish_state(
            &*self.publisher,
            &self.logger,
            &self.description,
            &self.unique_id,
            self.value,
            self.last_reset,
        );
    }
}

fn publish_state(
    publisher: &dyn StatePublisher,
    logger: &StructuredLogger,
    description: &SensorDescription,
    unique_id: &str,
    value: f64,
    last_reset: Option<DateTime<Utc>>,
) {
    let state = SensorState {
        unique_id: unique_id.to_string(),
        name: description.name.to_string(),
        icon: description.icon.to_string(),
        value,
        unit: description.unit,
        device_class: description.device_class,
        state_class: description.state_class,
        last_reset,
        updated_at: Utc::now(),
    };
    if let Err(e) = publisher.publish(state) {
        logger.error(&format!("Failed to publish state: {}", e));
    }
}
