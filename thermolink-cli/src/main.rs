mod cli;
mod config;
mod error;
mod sensors;

use std::sync::Arc;

use clap::Parser;
use thermolink_engine::{
    DeliveryOrchestrator, EventSink, HttpTransport, LifecycleEvent, LogIndicator, Notifier,
    NotifyConfig, OrchestratorConfig, PublisherConfig, TelemetryPublisher, Transport,
    TransportOptions,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::cli::Args;
use crate::config::AppConfig;
use crate::error::Result;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args).await {
        error!("Application error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref(), args.interval)?;
    info!(
        device = %config.device.name,
        interval_seconds = config.device.interval_seconds,
        "Starting thermolink agent"
    );

    let options = TransportOptions::default();
    let telemetry_transport: Arc<dyn Transport> = Arc::new(HttpTransport::pinned(
        &config.trust_anchor_pem()?,
        &options,
    )?);
    let notify_transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::with_webpki_roots(&options)?);

    let notifier: Arc<dyn EventSink> = Arc::new(Notifier::new(
        NotifyConfig {
            base_url: config.notify_base_url()?,
            api_key: config.notify.api_key.clone(),
        },
        notify_transport,
    ));

    let publisher = Arc::new(TelemetryPublisher::new(
        PublisherConfig {
            endpoint: config.telemetry_endpoint()?,
            api_key: config.telemetry.api_key.clone(),
            event_name: config.notify.event_name.clone(),
        },
        telemetry_transport,
        notifier.clone(),
    ));

    let sensor = sensors::SimulatedSensor::new(
        config.sensor.baseline_temperature,
        config.sensor.baseline_humidity,
    );

    let orchestrator = DeliveryOrchestrator::new(
        OrchestratorConfig {
            device_name: config.device.name.clone(),
            event_name: config.notify.event_name.clone(),
            update_event_name: config.notify.update_event_name.clone(),
            interval: config.interval(),
        },
        sensor,
        publisher,
        notifier,
    )
    .with_indicator(Arc::new(LogIndicator));

    // The update collaborator would hold the sender end on device builds;
    // here it only carries the startup announcement.
    let (events_tx, events_rx) = mpsc::channel(8);
    let _ = events_tx.send(LifecycleEvent::Started).await;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    orchestrator.run(events_rx, shutdown).await;
    info!("Agent stopped");
    Ok(())
}
