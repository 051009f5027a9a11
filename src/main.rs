use dealflow::{create_app, AppState, Config};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load .env (if present) so DATABASE_URL from file is visible
    let _ = dotenv();

    let config = Config::from_env()?;

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        db,
        config: Arc::new(config),
    };

    // Run our server
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server running on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
