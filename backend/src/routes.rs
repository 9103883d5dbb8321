use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{debug, error, info, warn};
use serde::Deserialize;
use serde_json::json;
use shared::{CategorySummary, ProductSummary, TaskSubmitted};

use crate::catalog::registry::CatalogRegistry;
use crate::config::Config;
use crate::tasks;

/// Timeout for the forward to the inference service.
const FORWARD_TIMEOUT: Duration = Duration::from_secs(30);

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health_check)))
        .service(web::resource("/categories").route(web::get().to(get_categories)))
        .service(web::resource("/products").route(web::get().to(get_products)))
        .service(web::resource("/search/text").route(web::post().to(search_text)))
        .service(web::resource("/search/image").route(web::post().to(search_image)))
        .service(
            web::resource("/webhook/task_completed")
                .route(web::post().to(tasks::receive_task_callback)),
        )
        .service(
            web::resource("/tasks/{task_id}/result").route(web::get().to(tasks::get_task_result)),
        );
}

/// JSON bodies that fail to deserialize are schema violations, reported as
/// 422 rather than actix's default 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::UnprocessableEntity().json(json!({"error": detail})),
        )
        .into()
    })
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

async fn get_categories(catalog: web::Data<Arc<CatalogRegistry>>) -> HttpResponse {
    let categories: Vec<CategorySummary> = catalog.categories().iter().map(Into::into).collect();
    debug!("Listing {} categories", categories.len());
    HttpResponse::Ok().json(json!({"categories": categories}))
}

async fn get_products(catalog: web::Data<Arc<CatalogRegistry>>) -> HttpResponse {
    let products: Vec<ProductSummary> = catalog.products().iter().map(Into::into).collect();
    debug!("Listing {} products", products.len());
    HttpResponse::Ok().json(json!({"products": products}))
}

#[derive(Deserialize)]
struct TextSearch {
    #[serde(default)]
    query: String,
}

async fn search_text(
    payload: web::Json<TextSearch>,
    catalog: web::Data<Arc<CatalogRegistry>>,
) -> HttpResponse {
    info!("Text search - query: {:?}", payload.query);
    HttpResponse::Ok().json(catalog.search_text(&payload.query))
}

/// Submission gateway: accepts an image upload and forwards it to the
/// inference service, relaying the task identifier back to the client.
async fn search_image(
    mut payload: Multipart,
    config: web::Data<Config>,
    http: web::Data<reqwest::Client>,
) -> Result<HttpResponse, Error> {
    let mut image_data = Vec::new();
    let mut file_name = "upload".to_string();
    let mut content_type = String::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let field_type = field.content_type().map(|m| m.essence_str().to_string());
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk?;
            data.write_all(&bytes)?;
        }
        if !data.is_empty() {
            image_data = data;
            if let Some(t) = field_type {
                content_type = t;
            }
            if let Some(n) = field_name {
                file_name = n;
            }
        }
    }

    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "No image file in request"})));
    }
    if !content_type.starts_with("image/") {
        warn!("Rejected upload with content type {:?}", content_type);
        return Ok(HttpResponse::BadRequest()
            .json(json!({"error": "The uploaded file must be an image"})));
    }
    debug!(
        "Image read - {} bytes, forwarding to {}",
        image_data.len(),
        config.inference_url
    );

    let part = reqwest::multipart::Part::bytes(image_data)
        .file_name(file_name)
        .mime_str(&content_type)
        .map_err(actix_web::error::ErrorInternalServerError)?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = http
        .post(format!("{}/infer/image", config.inference_url))
        .multipart(form)
        .timeout(FORWARD_TIMEOUT)
        .send()
        .await;

    match response {
        Ok(response) if response.status().is_success() => {
            match response.json::<TaskSubmitted>().await {
                Ok(submitted) => {
                    info!("Inference task created - task_id: {}", submitted.task_id);
                    Ok(HttpResponse::Ok().json(submitted))
                }
                Err(e) => {
                    error!("Invalid response from inference service: {}", e);
                    Ok(HttpResponse::InternalServerError()
                        .json(json!({"error": "Invalid response from the inference service"})))
                }
            }
        }
        Ok(response) => {
            error!("Inference service returned status {}", response.status());
            Ok(HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to process the image in the inference service"})))
        }
        Err(e) => {
            error!("Could not reach inference service: {}", e);
            Ok(HttpResponse::InternalServerError().json(
                json!({"error": format!("Connection error to the inference service: {}", e)}),
            ))
        }
    }
}
