use std::io::Write;
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{debug, error, info};
use serde_json::json;
use shared::{SyncClassification, TaskSubmitted};

use crate::engine::ClassificationEngine;
use crate::queue::broker::QueueClient;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health_check)))
        .service(web::resource("/infer/image").route(web::post().to(infer_image)))
        .service(web::resource("/infer/image/sync").route(web::post().to(infer_image_sync)));
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

/// Reads the first non-empty file out of a multipart upload.
async fn read_image_field(payload: &mut Multipart) -> Result<Vec<u8>, Error> {
    while let Ok(Some(mut field)) = payload.try_next().await {
        let mut image_data = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            image_data.write_all(&data)?;
        }
        if !image_data.is_empty() {
            return Ok(image_data);
        }
    }
    Ok(Vec::new())
}

async fn infer_image(
    mut payload: Multipart,
    queue: web::Data<QueueClient>,
) -> Result<HttpResponse, Error> {
    let image_data = read_image_field(&mut payload).await?;
    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "No image file in request"})));
    }
    debug!("Image read for async inference - {} bytes", image_data.len());

    match queue.submit(image_data).await {
        Ok(task_id) => {
            info!("Queued classification task {}", task_id);
            Ok(HttpResponse::Ok().json(TaskSubmitted { task_id }))
        }
        Err(e) => {
            error!("Failed to enqueue classification task: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to enqueue task"})))
        }
    }
}

async fn infer_image_sync(
    mut payload: Multipart,
    engine: web::Data<Arc<ClassificationEngine>>,
) -> Result<HttpResponse, Error> {
    let image_data = read_image_field(&mut payload).await?;
    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "No image file in request"})));
    }
    debug!("Image read for sync inference - {} bytes", image_data.len());

    match engine.classify(&image_data) {
        Ok(predictions) => Ok(HttpResponse::Ok().json(SyncClassification {
            category: predictions,
        })),
        Err(e) => {
            error!("Sync inference failed: {}", e);
            Ok(HttpResponse::InternalServerError()
                .json(json!({"error": format!("Inference failed: {}", e)})))
        }
    }
}
