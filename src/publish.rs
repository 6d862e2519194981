//! State publication for sensor entities
//!
//! Sensors push their recomputed state through the [`StatePublisher`]
//! observer contract after every evaluation. The publisher makes no
//! assumptions about the consuming transport; the bundled implementation
//! fans states out over a tokio broadcast channel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::sensor::{DeviceClass, StateClass, UnitOfMeasurement};

/// A sensor's published state: the exposed value plus the descriptive
/// metadata bundle the hosting platform renders it with.
#[derive(Debug, Clone, Serialize)]
pub struct SensorState {
    /// Stable entity identifier
    pub unique_id: String,

    /// Display name
    pub name: String,

    /// Suggested display icon
    pub icon: String,

    /// Currently exposed reading
    pub value: f64,

    /// Unit of measurement
    pub unit: UnitOfMeasurement,

    /// Measured quantity classification
    pub device_class: DeviceClass,

    /// Accumulation classification
    pub state_class: StateClass,

    /// Session-boundary marker, set on zero readings
    pub last_reset: Option<DateTime<Utc>>,

    /// When this state was computed
    pub updated_at: DateTime<Utc>,
}

/// Observer contract: sensors call this after each recomputation.
pub trait StatePublisher: Send + Sync {
    /// Push an updated sensor state to the hosting platform
    fn publish(&self, state: SensorState) -> Result<()>;
}

/// Broadcast-channel publisher for in-process consumers
pub struct BroadcastPublisher {
    tx: broadcast::Sender<SensorState>,
}

impl BroadcastPublisher {
    /// Create a publisher with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to published sensor states
    pub fn subscribe(&self) -> broadcast::Receiver<SensorState> {
        self.tx.subscribe()
    }
}

impl StatePublisher for BroadcastPublisher {
    fn publish(&self, state: SensorState) -> Result<()> {
        // A send with no live subscribers is not an error
        let _ = self.tx.send(state);
        Ok(())
    }
}
