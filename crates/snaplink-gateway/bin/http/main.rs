mod cli;

use crate::cli::{CacheBackendArg, LogFormatArg, StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use snaplink_cache::{MokaUrlCache, RedisUrlCache};
use snaplink_core::{Repository, UrlCache};
use snaplink_gateway::{App, AppState, GatewayMetrics};
use snaplink_generator::RandomGenerator;
use snaplink_resolver::{AccessConfig, ResolutionService, ResolverSettings};
use snaplink_storage::{InMemoryRepository, MySqlRepository};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ACCESS_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting snaplink gateway"
    );

    match config.storage {
        StorageBackendArg::InMemory => with_cache(&config, InMemoryRepository::new()).await,
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("failed to connect to mysql")?;
            repository
                .ensure_schema()
                .await
                .context("failed to apply mysql schema")?;
            with_cache(&config, repository).await
        }
    }
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormatArg::Json => builder.json().init(),
        LogFormatArg::Pretty => builder.init(),
    }
}

async fn with_cache<R: Repository>(config: &CLI, repository: R) -> anyhow::Result<()> {
    match config.cache {
        CacheBackendArg::Moka => run_server(config, repository, MokaUrlCache::new()).await,
        CacheBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            let cache = RedisUrlCache::connect(redis_url)
                .await
                .context("failed to connect to redis")?;
            run_server(config, repository, cache).await
        }
    }
}

async fn run_server<R: Repository, C: UrlCache>(
    config: &CLI,
    repository: R,
    cache: C,
) -> anyhow::Result<()> {
    let metrics = Arc::new(GatewayMetrics::new().context("failed to register metrics")?);

    let settings = ResolverSettings::builder()
        .max_attempts(config.max_attempts)
        .store_timeout(Duration::from_millis(config.store_timeout_ms))
        .cache_timeout(Duration::from_millis(config.cache_timeout_ms))
        .cache_ttl(Duration::from_secs(config.cache_ttl_secs))
        .build();
    let access = AccessConfig::builder()
        .queue_capacity(config.access_queue_capacity)
        .store_timeout(Duration::from_millis(config.store_timeout_ms))
        .build();

    let (service, access_worker) =
        ResolutionService::new(repository, cache, RandomGenerator::new())
            .with_settings(settings)
            .with_event_sink(metrics.clone())
            .with_access_tracking(access);

    let state = AppState::new(Arc::new(service), config.base_url.as_str(), metrics);

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last service handle, so the access worker now drains and exits.
    match tokio::time::timeout(ACCESS_DRAIN_TIMEOUT, access_worker).await {
        Ok(Ok(())) => info!("access worker drained"),
        Ok(Err(e)) => warn!(error = %e, "access worker failed"),
        Err(_) => warn!("access worker did not drain in time"),
    }

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
