use std::net::SocketAddr;
use std::sync::Arc;

use simhire_backend::{
    config::{Config, LogFormat},
    database::{
        pool::{create_pool, run_migrations},
        PgStore,
    },
    routes, services::model_gateway::OpenAiGateway,
    AppSettings, AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;
    info!("Database ready");

    let gateway = OpenAiGateway::new(&config.gateway)?;
    info!(model = %config.gateway.model, base_url = %config.gateway.base_url, "Model gateway configured");

    let app_state = AppState::new(
        Arc::new(PgStore::new(pool)),
        Arc::new(gateway),
        AppSettings::from(&config),
    );
    let app = routes::build_router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
