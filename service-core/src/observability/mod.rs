pub mod logging;
pub mod metrics;

pub use logging::{TelemetryConfig, init_tracing};
pub use metrics::{install_prometheus_recorder, render_metrics};
