// src/config.rs

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::services::{LocationService, RouteService};

// A connection string pode vir com qualquer um destes nomes.
const DATABASE_URL_KEYS: [&str; 2] = ["DATABASE_URL", "POSTGRES_URL"];

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta as configurações a partir de qualquer fonte chave/valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = DATABASE_URL_KEYS
            .iter()
            .filter_map(|&key| lookup(key))
            .find(|value| !value.trim().is_empty());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?,
            None => 3000,
        };

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a number: {}", e))?,
            None => 5,
        };

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            max_connections,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    // `None` quando o banco não pôde ser inicializado: os handlers respondem 500.
    pub db_pool: Option<PgPool>,
    pub route_service: RouteService,
    pub location_service: LocationService,
}

impl AppState {
    pub async fn new(settings: Settings) -> Self {
        let db_pool = match settings.database_url.as_deref() {
            Some(url) => connect(url, settings.max_connections).await,
            None => {
                tracing::warn!("No DATABASE_URL / POSTGRES_URL set; running without a database");
                None
            }
        };

        Self::with_pool(settings, db_pool)
    }

    pub fn with_pool(settings: Settings, db_pool: Option<PgPool>) -> Self {
        Self {
            settings: Arc::new(settings),
            db_pool,
            route_service: RouteService::default(),
            location_service: LocationService::default(),
        }
    }
}

async fn connect(url: &str, max_connections: u32) -> Option<PgPool> {
    match PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(url)
        .await
    {
        Ok(pool) => {
            tracing::info!("✅ Database connection established");
            Some(pool)
        }
        Err(e) => {
            tracing::error!("🔥 Failed to connect to the database: {:?}", e);
            None
        }
    }
}
