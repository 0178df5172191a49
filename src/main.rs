//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use route_manager::{build_router, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "route_manager=info,tower_http=info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let addr = settings.bind_addr()?;

    // Sem banco o servidor sobe mesmo assim; as rotas de dados respondem 500.
    let app_state = AppState::new(settings).await;

    if let Some(pool) = &app_state.db_pool {
        match sqlx::migrate!().run(pool).await {
            Ok(()) => tracing::info!("✅ Database migrations applied"),
            Err(e) => tracing::error!("🔥 Failed to run database migrations: {}", e),
        }
    }

    let app = build_router(app_state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
