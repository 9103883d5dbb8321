mod catalog;
mod config;
mod routes;
mod store;
mod tasks;

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};

use catalog::registry::CatalogRegistry;
use config::Config;
use routes::configure_routes;
use store::result_store::ResultStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = Config::from_env();

    let catalog = Arc::new(CatalogRegistry::load_from_dir(Path::new(
        &config.catalog_data_dir,
    )));
    if catalog.category_count() == 0 {
        log::warn!("Catalog is empty; classification callbacks will not validate");
    }

    let result_store = Arc::new(ResultStore::new());
    let http_client = reqwest::Client::new();

    log::info!("Starting search server on {}", config.bind_address);
    let bind_address = config.bind_address.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(routes::json_config())
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(catalog.clone()))
            .app_data(web::Data::new(result_store.clone()))
            .app_data(web::Data::new(http_client.clone()))
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
