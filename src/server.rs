//! Web server

use crate::cli;

use std::{io, net::SocketAddr, str::FromStr, time::Duration};

use axum::Router;
use axum_server::Handle;
use tokio::signal;

/// Serve the user insights service
///
/// # Arguments
///
/// * `args`: Command line arguments
/// * `service`: The [Router] to serve, see [crate::app::service]
pub async fn serve(args: &cli::CommandLineArgs, service: Router) -> io::Result<()> {
    let addr = SocketAddr::from_str(&format!("{}:{}", args.host, args.port)).map_err(|err| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid host name, IP address or port number: {}", err),
        )
    })?;

    // Catch ctrl+c and try to shutdown gracefully
    let handle = Handle::new();
    tokio::spawn(shutdown_signal(
        handle.clone(),
        args.graceful_shutdown_timeout,
    ));

    tracing::info!(%addr, users_file = %args.users_file, "listening");
    axum_server::bind(addr)
        .handle(handle)
        .serve(service.into_make_service())
        .await
}

/// Graceful shutdown handler
///
/// Installs signal handlers to catch Ctrl-C or SIGTERM and trigger a graceful shutdown.
async fn shutdown_signal(handle: Handle, timeout: u64) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
    // Force shutdown if graceful shutdown takes longer than the timeout
    handle.graceful_shutdown(Some(Duration::from_secs(timeout)));
}
