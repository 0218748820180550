use dotenvy::dotenv;
use training_scheduler::{
    config::{database, scheduling},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Engine settings
    let config = scheduling::load_default_config()
        .inspect_err(|e| error!("Failed to load scheduling configuration: {}", e))?;
    info!(
        "Scheduling configuration: time parsing {:?}, projection {:?}",
        config.time_policy, config.projection
    );

    // 4. Database, creating the local data directory for the default URL
    if std::env::var("DATABASE_URL").is_err() {
        std::fs::create_dir_all("data")?;
    }
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    info!("Schema ready on {}", database::get_database_url());

    Ok(())
}
