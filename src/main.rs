use std::{process, sync::Arc};

use clientbooks::{
    application::{
        clientes::ClienteService,
        email::EmailSender,
        error::AppError,
        especialistas::EspecialistaService,
        faturamento::FaturamentoService,
        permissions::PermissionService,
        repos::{
            ClientesRepo, ClientesWriteRepo, DisparosRepo, EmpresasRepo, EspecialistasRepo,
            PermissionsRepo, RequerimentosRepo, RequerimentosWriteRepo,
        },
        requerimentos::RequerimentoService,
        retry::RetryPolicy,
    },
    config,
    infra::{
        db::PostgresRepositories,
        email::{DisabledEmailSender, HttpEmailSender},
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use sqlx::PgPool;
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
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
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
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect(&settings).await?;
    migrate(&pool).await?;

    let repositories = Arc::new(PostgresRepositories::new(pool));
    let state = build_api_state(repositories, &settings)?;

    http::serve(settings.server.addr, http::build_router(state))
        .await
        .map_err(AppError::from)
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect(&settings).await?;
    migrate(&pool).await?;
    info!(target: "clientbooks::migrate", "migrations applied");
    Ok(())
}

async fn connect(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    PostgresRepositories::connect(
        database_url,
        settings.database.max_connections.get(),
        settings.database.acquire_timeout,
    )
    .await
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    PostgresRepositories::run_migrations(pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))
}

fn build_email_sender(
    settings: &config::Settings,
    retry: RetryPolicy,
) -> Result<Arc<dyn EmailSender>, AppError> {
    let Some(endpoint) = settings.email.endpoint.clone() else {
        warn!(
            target: "clientbooks::email",
            "no e-mail endpoint configured, billing dispatch is disabled"
        );
        return Ok(Arc::new(DisabledEmailSender));
    };

    let sender = HttpEmailSender::new(
        endpoint,
        settings.email.api_key.clone(),
        settings.email.timeout,
        retry,
    )?;
    Ok(Arc::new(sender))
}

fn build_api_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<ApiState, AppError> {
    let requerimentos_repo: Arc<dyn RequerimentosRepo> = repositories.clone();
    let requerimentos_write_repo: Arc<dyn RequerimentosWriteRepo> = repositories.clone();
    let clientes_repo: Arc<dyn ClientesRepo> = repositories.clone();
    let clientes_write_repo: Arc<dyn ClientesWriteRepo> = repositories.clone();
    let empresas_repo: Arc<dyn EmpresasRepo> = repositories.clone();
    let disparos_repo: Arc<dyn DisparosRepo> = repositories.clone();
    let permissions_repo: Arc<dyn PermissionsRepo> = repositories.clone();
    let especialistas_repo: Arc<dyn EspecialistasRepo> = repositories.clone();

    let retry = RetryPolicy::from(&settings.retry);
    let sender = build_email_sender(settings, retry)?;

    Ok(ApiState {
        requerimentos: Arc::new(RequerimentoService::new(
            requerimentos_repo.clone(),
            requerimentos_write_repo,
            empresas_repo.clone(),
        )),
        faturamento: Arc::new(FaturamentoService::new(
            requerimentos_repo,
            empresas_repo.clone(),
            sender,
        )),
        clientes: Arc::new(ClienteService::new(
            clientes_repo,
            clientes_write_repo,
            empresas_repo,
            disparos_repo,
        )),
        especialistas: Arc::new(EspecialistaService::new(
            especialistas_repo,
            settings.cache.especialistas_ttl,
        )),
        permissions: Arc::new(PermissionService::new(permissions_repo, retry)),
        health: repositories,
    })
}
