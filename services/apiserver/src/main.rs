//! zonegate API server entry point.
//!
//! Loads configuration, wires the authorizer and backend, then serves the API
//! and the metrics endpoint until Ctrl-C.
use apiserver::app::App;
use apiserver::config::ApiServerConfig;
use apiserver::observability;
use clap::Parser;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "zonegate-apiserver", version, about = "Token-gated DNS zone API")]
struct Cli {
    /// YAML file overriding environment configuration.
    #[arg(long, env = "ZONEGATE_CONFIG")]
    config: Option<PathBuf>,
    /// Listen address for the API, overriding configuration.
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

fn load_config(cli: &Cli) -> anyhow::Result<ApiServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ApiServerConfig::from_env_and_file(path)?,
        None => ApiServerConfig::from_env()?,
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    Ok(config)
}

async fn run_with_shutdown<F>(config: ApiServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("zonegate-apiserver")?;
    let app = App::from_config(&config)?;
    let backend_name = app.state.backend.backend_name();
    let (stop_metrics, metrics_stopped) = tokio::sync::oneshot::channel::<()>();
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
        async move {
            let _ = metrics_stopped.await;
        },
    ));

    let addr = config.bind_addr;
    tracing::info!(%addr, backend = backend_name, "zonegate api server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_router().into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    let _ = stop_metrics.send(());
    match metrics_task.await {
        Ok(Err(err)) => tracing::warn!(error = %err, "metrics listener failed"),
        Ok(Ok(())) | Err(_) => {}
    }
    Ok(())
}
