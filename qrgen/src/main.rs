use std::time::Instant;

use clap::Parser;
use qrgen::{Application, Config, telemetry};

/// Resolve with the name of the first termination signal received.
async fn termination_signal() -> &'static str {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}

async fn shutdown_signal() {
    let signal = termination_signal().await;
    tracing::info!(signal, "Shutting down, finishing in-flight requests");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // OTLP export builds a rustls client; the provider must exist first
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = qrgen::config::Args::parse();
    let config = Config::load(&args)?;

    if args.validate {
        println!("Configuration in {} is valid.", args.config);
        return Ok(());
    }

    telemetry::init_telemetry(config.enable_otel_export)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), config = %args.config, "Starting qrgen");

    let started = Instant::now();
    let app = Application::new(config)?;
    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "Renderer ready");

    app.serve(shutdown_signal()).await
}
