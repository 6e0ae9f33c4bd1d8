use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use serviceplan_api::config::ApiConfig;
use serviceplan_db::{PgPlanStore, create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let db_pool = create_pool(&config.database_url, config.max_connections)
        .await
        .wrap_err("Failed to connect to the database")?;
    initialize_database(&db_pool).await?;

    serviceplan_api::start_server(config, Arc::new(PgPlanStore::new(db_pool))).await?;

    Ok(())
}
