use tracing::{error, info};

use waymark_all_in_one::bootstrap;
use waymark_all_in_one::config::ServiceConfig;
use waymark_all_in_one::telemetry::init_telemetry;

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_telemetry(&config.log_level);
    info!("Starting waymark-all-in-one service");

    let (amqp_client, services) = match bootstrap(&config).await {
        Ok(wired) => wired,
        Err(e) => {
            error!("Failed to initialize shared dependencies: {:#}", e);
            std::process::exit(1);
        }
    };

    // Startup probe: one cheap read proves the store path end to end.
    match services.devices.list_devices().await {
        Ok(devices) => info!(count = devices.len(), "Device registry online"),
        Err(e) => {
            error!("Device store probe failed: {}", e);
            amqp_client.close().await;
            std::process::exit(1);
        }
    }

    info!("Service ready, waiting for shutdown signal");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down");
    amqp_client.close().await;
    info!("Cleanup complete");
}
