use crosspost_web::config::get_configuration;
use crosspost_web::startup::{build_router, build_state};
use dotenvy::dotenv;
use service_core::observability::{init_tracing, install_prometheus_recorder, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let telemetry = &configuration.telemetry;
    init_tracing(TelemetryConfig {
        service_name: &telemetry.service_name,
        log_level: &telemetry.log_level,
        otlp_endpoint: telemetry.otlp_endpoint.as_deref(),
    })?;

    install_prometheus_recorder()?;

    let state = build_state(&configuration)?;
    let app = build_router(state, &configuration.session);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!(
        relay_path = %configuration.identity.relay_path,
        "Starting crosspost-web on {}", address
    );
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
