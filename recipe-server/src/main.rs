mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;
use data::label_repository::PostgresLabelRepository;
use data::recipe_repository::PostgresRecipeRepository;
use data::user_repository::PostgresUserRepository;
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use infrastructure::security::JwtKeys;
use presentation::routes::Services;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let pool = create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let services = Services::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresRecipeRepository::new(pool.clone())),
        Arc::new(PostgresLabelRepository::new(pool.clone())),
        JwtKeys::new(config.jwt_secret.clone(), config.token_ttl_hours),
    );

    if let Some(admin) = &config.admin {
        services
            .auth
            .ensure_superuser(&admin.email, &admin.password)
            .await
            .context("failed to provision superuser")?;
    }

    info!(host = %config.host, port = config.port, "starting recipe server");

    server::start_rest_server(config, services).await
}
