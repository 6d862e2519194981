use anyhow::Result;
use eos::cloud::EoCloudClient;
use eos::coordinator::ChargerCoordinator;
use eos::publish::BroadcastPublisher;
use eos::sensor::{SessionChargingTimeSensor, SessionEnergySensor};
use std::sync::Arc;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = eos::Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    eos::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Eos EO Mini charger monitor {} starting up", env!("APP_VERSION"));

    let client = EoCloudClient::new(config.cloud.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create cloud client: {}", e))?;
    let mut coordinator = ChargerCoordinator::new(config, Box::new(client));
    coordinator
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize coordinator: {}", e))?;
    let serial = coordinator
        .serial()
        .ok_or_else(|| anyhow::anyhow!("Coordinator did not discover a charger serial"))?
        .to_string();

    // Register the sensor entities with a shared broadcast publisher
    let publisher = Arc::new(BroadcastPublisher::new(64));
    coordinator.register_sensor(Box::new(SessionEnergySensor::new(&serial, publisher.clone())));
    coordinator.register_sensor(Box::new(SessionChargingTimeSensor::new(
        &serial,
        publisher.clone(),
    )));

    // Log published states; stands in for the platform's display layer
    let mut states = BroadcastStream::new(publisher.subscribe());
    let state_task = tokio::spawn(async move {
        while let Some(update) = states.next().await {
            if let Ok(state) = update {
                info!(
                    "{} = {} {:?} (last_reset: {:?})",
                    state.unique_id, state.value, state.unit, state.last_reset
                );
            }
        }
    });

    let shutdown = coordinator.shutdown_handle();
    let run_task = tokio::spawn(async move { coordinator.run().await });

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received, shutting down");
    shutdown.send(()).ok();

    let result = match run_task.await {
        Ok(Ok(())) => {
            info!("Coordinator shutdown complete");
            Ok(())
        }
        Ok(Err(e)) => {
            error!("Coordinator failed with error: {}", e);
            Err(anyhow::anyhow!("Coordinator error: {}", e))
        }
        Err(e) => Err(anyhow::anyhow!("Coordinator task panicked: {}", e)),
    };

    state_task.abort();
    result
}
