use std::path::PathBuf;

use genie_datasource::Result;
use genie_datasource::config::Config;
use genie_datasource::genie_client::GenieClient;
use genie_datasource::metrics::MetricContext;
use genie_datasource::paging::Pager;
use genie_datasource::server::{self, AuthPolicy};
use genie_datasource::telemetry::{LogFormat, init_tracing};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use super::cli::Cli;

const DEFAULT_CONFIG: &str = "config.toml";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), LogFormat::from_flag(cli.json_logs))?;

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = Config::from_env_and_file(&config_path)?;
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }

    let opsgenie = &config.opsgenie;
    let client = GenieClient::new(
        opsgenie.base_url.clone(),
        &opsgenie.api_key,
        opsgenie.http_request_timeout,
        opsgenie.http_connect_timeout,
        cli.insecure,
    )?;
    let ctx = MetricContext {
        client,
        pager: Pager::new(opsgenie.page_size),
        concurrency: opsgenie.concurrency,
    };

    let auth = AuthPolicy::from_credentials(config.server.credentials.as_ref());
    if matches!(auth, AuthPolicy::AllowAll) {
        warn!("no HTTP credentials configured; all requests are allowed");
    }

    info!(
        base_url = %opsgenie.base_url,
        page_size = opsgenie.page_size,
        concurrency = opsgenie.concurrency,
        "starting datasource"
    );

    let listener = TcpListener::bind(config.server.listen).await?;
    server::serve(listener, server::build_router(ctx, auth), shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
