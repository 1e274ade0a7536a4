use std::{error::Error as StdError, process, sync::Arc};

use notecache::{
    application::{error::AppError, notes::NoteService, repos::NotesRepo},
    cache::{AggregateCache, CacheConfig},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = error_chain(error);
    if dispatcher::has_been_set() {
        error!(error = %chain, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %chain, "application error");
    });
}

fn error_chain(error: &dyn StdError) -> String {
    let mut chain = error.to_string();
    let mut current = error.source();
    while let Some(inner) = current {
        chain.push_str(": ");
        chain.push_str(&inner.to_string());
        current = inner.source();
    }
    chain
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    // The cache has to be usable before the listener accepts requests.
    let cache = init_cache(&settings);

    // The store connects on first use; failures surface per request.
    let repositories = init_repositories(&settings)?;
    spawn_migrations(repositories.clone());

    let store: Arc<dyn NotesRepo> = repositories;
    let notes = Arc::new(NoteService::new(store, cache));

    serve_http(&settings, HttpState { notes }).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings)?;

    info!(target = "notecache::migrate", "Applying migrations");
    PostgresRepositories::run_migrations(repositories.pool())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = "notecache::migrate", "Migrations applied");
    Ok(())
}

fn init_cache(settings: &config::Settings) -> AggregateCache {
    let cache = AggregateCache::in_memory(&CacheConfig::from(&settings.cache));
    info!(
        target = "notecache::cache",
        ttl_secs = cache.ttl().as_secs(),
        "aggregate cache ready"
    );
    cache
}

fn init_repositories(settings: &config::Settings) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect_lazy(database_url, settings.database.max_connections.get())
            .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn spawn_migrations(repositories: Arc<PostgresRepositories>) {
    tokio::spawn(async move {
        match PostgresRepositories::run_migrations(repositories.pool()).await {
            Ok(()) => info!(target = "notecache::store", "store connected and migrated"),
            Err(err) => error!(
                target = "notecache::store",
                error = %err,
                "store unavailable; requests will fail until it recovers"
            ),
        }
    });
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let addr = settings.server.addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::from(InfraError::bind(addr, err)))?;

    info!(
        target = "notecache::http",
        addr = %addr,
        "Server running"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target = "notecache::http", "shutdown signal received");
}
