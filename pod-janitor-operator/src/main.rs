use std::future::Future;
use std::process::ExitCode;

use clap::Parser as _;
use pod_janitor::Supervisor;
use pod_janitor::SystemClock;
use pod_janitor_kubeapi::KubeApi;
use rand::SeedableRng as _;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod args;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let args = args::Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let vcs_ref = std::env::var("VCS_REF").unwrap_or_else(|_| "main".to_string());
    let build_date = std::env::var("BUILD_DATE").unwrap_or_default();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        %vcs_ref,
        %build_date,
        "Starting pod-janitor"
    );

    let shutdown = shutdown()?;
    let kubeapi = KubeApi::new(args.namespace.clone(), &args.label_selector).await?;
    let mut supervisor = Supervisor::new(kubeapi, args.config(), SystemClock, StdRng::from_entropy());

    match supervisor.run(shutdown).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::error!(%err, "Giving up");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Installs the SIGINT and SIGTERM handlers right away and returns a future
/// resolving on the first of them, however late it is polled.
#[cfg(unix)]
fn shutdown() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix;

    let mut interrupt = unix::signal(unix::SignalKind::interrupt())?;
    let mut terminate = unix::signal(unix::SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => tracing::info!("SIGINT received"),
            _ = terminate.recv() => tracing::info!("SIGTERM received"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown() -> std::io::Result<impl Future<Output = ()>> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Ctrl-C received");
                let _ = tx.send(());
            }
            Err(err) => tracing::error!(%err, "Cannot listen for Ctrl-C"),
        }
    });
    Ok(async move {
        if rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    })
}
