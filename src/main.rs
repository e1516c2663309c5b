use fitnease_planning::api::routes::create_routes;
use fitnease_planning::config::{run_migrations, AppConfig, CollaboratorConfig, DatabaseConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let app_config = AppConfig::from_env()?;
    let database_config = DatabaseConfig::from_env()?;
    let collaborators = CollaboratorConfig::from_env()?;

    let pool = database_config.create_pool().await?;
    run_migrations(&pool).await?;

    let app = create_routes(pool, &collaborators);

    let address = app_config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Planning service starting on http://{}", address);
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
