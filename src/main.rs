use std::{error::Error as StdError, future::IntoFuture, process, sync::Arc};

use pagestash::{
    application::{
        error::AppError,
        pages::PageService,
        repos::{ArticlesRepo, ArticlesWriteRepo, DatabaseHealth},
        seed::{self, SeedOutcome},
    },
    cache::{ArtifactStore, RenderCacheGateway},
    config,
    infra::{
        db::PostgresRepositories,
        error::{DatabaseStage, InfraError},
        http::{self, HttpState},
        object_store::ObjectStoreClient,
        telemetry,
    },
    presentation::views::TemplateRenderer,
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let mut causes = Vec::new();
    let mut current = StdError::source(error);
    while let Some(inner) = current {
        causes.push(inner.to_string());
        current = inner.source();
    }

    if dispatcher::has_been_set() {
        error!(error = %error, causes = ?causes, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, causes = ?causes, "application error");
    });
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
        config::Command::Seed(args) => run_seed(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    if settings.articles.seed_on_empty {
        let outcome = seed::seed_if_empty(
            repositories.as_ref(),
            repositories.as_ref(),
            &settings.articles.seed_file,
        )
        .await?;
        match outcome {
            SeedOutcome::Imported { inserted } => info!(
                target = "pagestash::seed",
                inserted,
                path = %settings.articles.seed_file.display(),
                "seeded empty articles table"
            ),
            SeedOutcome::AlreadyPopulated { existing } => info!(
                target = "pagestash::seed",
                existing,
                "articles table already populated"
            ),
        }
    }

    let store: Arc<dyn ArtifactStore> =
        Arc::new(ObjectStoreClient::from_settings(&settings.store).map_err(AppError::from)?);
    info!(
        target = "pagestash::store",
        backend = store.name(),
        bucket = %settings.store.bucket,
        endpoint = %settings.store.endpoint,
        region = %settings.store.region,
        signed = settings.store.credentials.is_some(),
        "object store configured"
    );

    let gateway = RenderCacheGateway::new(store, Arc::new(TemplateRenderer::new()))
        .with_store_timeout(settings.store.timeout);

    let articles_repo: Arc<dyn ArticlesRepo> = repositories.clone();
    let db_health: Arc<dyn DatabaseHealth> = repositories;
    let http_state = HttpState {
        pages: Arc::new(PageService::new(
            articles_repo,
            gateway,
            settings.site.clone(),
        )),
        db: db_health,
    };

    serve_http(&settings, http_state).await
}

async fn run_seed(settings: config::Settings, args: config::SeedArgs) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let writer: &dyn ArticlesWriteRepo = repositories.as_ref();
    seed::import_file(writer, &args.file).await?;
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or(InfraError::MissingSetting {
            key: "database.url",
        })
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(DatabaseStage::Connect, err)))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(DatabaseStage::Migrate, err)))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn serve_http(settings: &config::Settings, http_state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(http_state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "pagestash::http",
        addr = %settings.server.public_addr,
        "listening"
    );

    let shutdown_started = Arc::new(Notify::new());
    let signal_notify = Arc::clone(&shutdown_started);
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            signal_notify.notify_one();
        })
        .into_future();

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = async {
            shutdown_started.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(
                target = "pagestash::http",
                grace_secs = grace.as_secs(),
                "graceful shutdown timed out, dropping open connections"
            );
        }
    }

    info!(target = "pagestash::http", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(target = "pagestash::http", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(target = "pagestash::http", error = %err, "failed to listen for SIGTERM");
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

    info!(target = "pagestash::http", "shutdown signal received");
}
