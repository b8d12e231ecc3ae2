use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger, NormalizePath};
use actix_web::{App, HttpServer};

use crate::infrastructure::config::AppConfig;
use crate::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use crate::presentation::routes::{self, Services};

pub async fn start_rest_server(config: AppConfig, services: Services) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    HttpServer::new(move || {
        let cors = build_cors(&config);

        // Request id wraps timing so the completion event carries the id.
        App::new()
            .wrap(Logger::default())
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Permissions-Policy", "geolocation=()"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .wrap(NormalizePath::trim())
            .configure(routes::configure(services.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
