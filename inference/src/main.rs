mod config;
mod engine;
mod queue;
mod routes;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};

use config::Config;
use engine::ClassificationEngine;
use queue::broker::{Broker, IMAGE_QUEUE};
use queue::worker::{self, CallbackReporter};
use routes::configure_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = Config::from_env();

    let engine = match ClassificationEngine::load(&config.model_path) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            log::error!("Failed to preload model at startup: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Model loading failed: {}", e),
            ));
        }
    };
    log::info!("Classification model loaded from {}", config.model_path);

    let broker = Broker::new();
    let receiver = broker.declare(IMAGE_QUEUE, config.queue_capacity);
    let queue_client = broker.client(IMAGE_QUEUE).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::Other, format!("Queue setup failed: {}", e))
    })?;

    let reporter = CallbackReporter::new(config.callback_url.clone());
    worker::spawn(config.worker_count, receiver, engine.clone(), reporter);
    log::info!(
        "Started {} workers on queue {:?}, reporting to {}",
        config.worker_count,
        IMAGE_QUEUE,
        config.callback_url
    );

    log::info!("Starting inference server on {}", config.bind_address);
    let bind_address = config.bind_address.clone();

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(engine.clone()))
            .app_data(web::Data::new(queue_client.clone()))
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
