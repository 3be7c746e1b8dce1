//! This file defines the user-insights binary entry point.

use user_insights::app;
use user_insights::cli;
use user_insights::metrics;
use user_insights::server;
use user_insights::tracing;

use std::process::exit;

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing();
    ::tracing::debug!(?args, "parsed arguments");
    if let Err(err) = metrics::register_metrics() {
        ::tracing::error!("failed to register metrics: {}", err);
        exit(1)
    }
    let service = app::service(&args);
    if let Err(err) = server::serve(&args, service).await {
        ::tracing::error!("server error: {}", err);
        exit(1)
    }
}
