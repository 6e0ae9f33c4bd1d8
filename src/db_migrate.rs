use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use serviceplan_db::{create_pool, schema::initialize_database};
use tracing::{Level, info};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL environment variable must be set")?;

    info!("Connecting to database...");
    let db_pool = create_pool(&database_url, 1).await?;

    initialize_database(&db_pool).await?;

    Ok(())
}
