use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eos::cloud::CloudSession;
use eos::coordinator::ChargerCoordinator;
use eos::publish::BroadcastPublisher;
use eos::sensor::{
    ChargerSensor, DeviceClass, SensorDescription, SessionEnergySensor, StateClass,
    UnitOfMeasurement,
};
use eos::snapshot::LiveSnapshot;
use eos::{Config, EosError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted cloud transport: yields queued documents, then errors
struct ScriptedCloud {
    serial: String,
    documents: VecDeque<eos::Result<LiveSnapshot>>,
}

impl ScriptedCloud {
    fn new(serial: &str, documents: Vec<eos::Result<LiveSnapshot>>) -> Self {
        Self {
            serial: serial.to_string(),
            documents: documents.into(),
        }
    }
}

#[async_trait]
impl CloudSession for ScriptedCloud {
    async fn charger_serial(&mut self) -> eos::Result<String> {
        Ok(self.serial.clone())
    }

    async fn live_snapshot(&mut self) -> eos::Result<LiveSnapshot> {
        self.documents
            .pop_front()
            .unwrap_or_else(|| Err(EosError::api("script exhausted")))
    }
}

/// Records every notification it receives from the coordinator
struct ProbeSensor {
    description: SensorDescription,
    unique_id: String,
    notifications: Arc<Mutex<Vec<Option<f64>>>>,
}

impl ProbeSensor {
    fn new(notifications: Arc<Mutex<Vec<Option<f64>>>>) -> Self {
        Self {
            description: SensorDescription {
                key: "probe",
                name: "Probe",
                icon: "mdi:ev-station",
                unit: UnitOfMeasurement::WattHours,
                device_class: DeviceClass::Energy,
                state_class: StateClass::Total,
            },
            unique_id: "eo_mini_charger_test_probe".to_string(),
            notifications,
        }
    }
}

impl ChargerSensor for ProbeSensor {
    fn description(&self) -> &SensorDescription {
        &self.description
    }

    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn value(&self) -> f64 {
        0.0
    }

    fn last_reset(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn handle_coordinator_update(&mut self, data: Option<&LiveSnapshot>) {
        self.notifications
            .lock()
            .unwrap()
            .push(data.and_then(|snap| snap.eskwh));
    }
}

fn snapshot_with_rate(eskwh: f64) -> LiveSnapshot {
    let mut snap = LiveSnapshot::default();
    snap.eskwh = Some(eskwh);
    snap
}

#[tokio::test]
async fn initialize_discovers_the_charger_serial() {
    let cloud = ScriptedCloud::new("EO-00472", vec![]);
    let mut coordinator = ChargerCoordinator::new(Config::default(), Box::new(cloud));

    coordinator.initialize().await.unwrap();
    assert_eq!(coordinator.serial(), Some("EO-00472"));
}

#[tokio::test]
async fn registration_before_first_poll_delivers_no_data() {
    let cloud = ScriptedCloud::new("EO-00472", vec![]);
    let mut coordinator = ChargerCoordinator::new(Config::default(), Box::new(cloud));

    let notifications = Arc::new(Mutex::new(Vec::new()));
    coordinator.register_sensor(Box::new(ProbeSensor::new(notifications.clone())));

    // The immediate registration update sees an empty coordinator
    assert_eq!(notifications.lock().unwrap().as_slice(), &[None]);
    assert!(coordinator.data().is_none());
}

#[tokio::test]
async fn poll_cycle_notifies_every_registered_sensor() {
    let cloud = ScriptedCloud::new(
        "EO-00472",
        vec![Ok(snapshot_with_rate(3600.0)), Ok(snapshot_with_rate(0.0))],
    );
    let mut coordinator = ChargerCoordinator::new(Config::default(), Box::new(cloud));

    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    coordinator.register_sensor(Box::new(ProbeSensor::new(first.clone())));
    coordinator.register_sensor(Box::new(ProbeSensor::new(second.clone())));

    coordinator.poll_cycle().await.unwrap();
    coordinator.poll_cycle().await.unwrap();

    // Registration no-op, then one notification per successful poll
    assert_eq!(
        first.lock().unwrap().as_slice(),
        &[None, Some(3600.0), Some(0.0)]
    );
    assert_eq!(
        second.lock().unwrap().as_slice(),
        &[None, Some(3600.0), Some(0.0)]
    );
    assert_eq!(coordinator.total_polls(), 2);
}

#[tokio::test]
async fn fetch_failure_keeps_previous_snapshot_and_skips_notification() {
    let cloud = ScriptedCloud::new(
        "EO-00472",
        vec![
            Ok(snapshot_with_rate(1800.0)),
            Err(EosError::http("connection refused")),
        ],
    );
    let mut coordinator = ChargerCoordinator::new(Config::default(), Box::new(cloud));

    let notifications = Arc::new(Mutex::new(Vec::new()));
    coordinator.register_sensor(Box::new(ProbeSensor::new(notifications.clone())));

    coordinator.poll_cycle().await.unwrap();
    let held = coordinator.data().unwrap();

    // The failed cycle must not clear the held snapshot or notify sensors
    coordinator.poll_cycle().await.unwrap();
    assert_eq!(coordinator.data().unwrap().eskwh, held.eskwh);
    assert_eq!(
        notifications.lock().unwrap().as_slice(),
        &[None, Some(1800.0)]
    );
    assert_eq!(coordinator.total_polls(), 1);
}

#[tokio::test]
async fn registration_after_data_gets_an_immediate_update() {
    let cloud = ScriptedCloud::new("EO-00472", vec![Ok(snapshot_with_rate(7200.0))]);
    let mut coordinator = ChargerCoordinator::new(Config::default(), Box::new(cloud));

    coordinator.poll_cycle().await.unwrap();

    let notifications = Arc::new(Mutex::new(Vec::new()));
    coordinator.register_sensor(Box::new(ProbeSensor::new(notifications.clone())));
    assert_eq!(notifications.lock().unwrap().as_slice(), &[Some(7200.0)]);
}

#[tokio::test]
async fn snapshot_subscription_observes_poll_results() {
    let cloud = ScriptedCloud::new("EO-00472", vec![Ok(snapshot_with_rate(3600.0))]);
    let mut coordinator = ChargerCoordinator::new(Config::default(), Box::new(cloud));

    let mut data_rx = coordinator.subscribe_data();
    assert!(data_rx.borrow().is_none());

    coordinator.poll_cycle().await.unwrap();
    data_rx.changed().await.unwrap();
    assert_eq!(
        data_rx.borrow().as_ref().unwrap().eskwh,
        Some(3600.0)
    );
}

#[tokio::test]
async fn real_sensors_publish_through_the_coordinator() {
    let cloud = ScriptedCloud::new("EO-00472", vec![Ok(snapshot_with_rate(3600.0))]);
    let mut coordinator = ChargerCoordinator::new(Config::default(), Box::new(cloud));
    coordinator.initialize().await.unwrap();
    let serial = coordinator.serial().unwrap().to_string();

    let publisher = Arc::new(BroadcastPublisher::new(8));
    let mut states = publisher.subscribe();
    coordinator.register_sensor(Box::new(SessionEnergySensor::new(&serial, publisher.clone())));

    coordinator.poll_cycle().await.unwrap();

    let state = states.recv().await.unwrap();
    assert_eq!(state.unique_id, "eo_mini_charger_EO-00472_energy");
    assert!((state.value - 1.0).abs() < 1e-9);
}
