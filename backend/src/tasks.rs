use std::sync::Arc;

use actix_web::{HttpResponse, web};
use log::{debug, info, warn};
use serde_json::json;
use shared::{Prediction, SearchResults, TaskCallback, TaskState};

use crate::catalog::registry::CatalogRegistry;
use crate::config::Config;
use crate::store::result_store::{ResultStore, TaskOutcome};

/// Receives task outcome callbacks from the inference workers.
///
/// Payloads failing validation never reach the store. Predictions below the
/// callback-side confidence floor are dropped before storing; the entry is
/// created even if nothing survives, so a finished task is distinguishable
/// from one still in flight.
pub async fn receive_task_callback(
    payload: web::Json<TaskCallback>,
    catalog: web::Data<Arc<CatalogRegistry>>,
    store: web::Data<Arc<ResultStore>>,
    config: web::Data<Config>,
) -> HttpResponse {
    let payload = payload.into_inner();
    info!(
        "Task callback received - task {} state {}",
        payload.task_id, payload.state
    );

    let category_count = catalog.category_count() as u32;
    for prediction in &payload.categories {
        if prediction.label < 1 || prediction.label > category_count {
            warn!(
                "Rejected callback for task {}: label {} outside [1, {}]",
                payload.task_id, prediction.label, category_count
            );
            return HttpResponse::UnprocessableEntity().json(json!({
                "error": format!("label {} outside the category range", prediction.label)
            }));
        }
        if !(0.0..=1.0).contains(&prediction.score) {
            warn!(
                "Rejected callback for task {}: score {} outside [0, 1]",
                payload.task_id, prediction.score
            );
            return HttpResponse::UnprocessableEntity().json(json!({
                "error": format!("score {} outside [0, 1]", prediction.score)
            }));
        }
    }

    match payload.state {
        TaskState::Failed => {
            let reason = payload
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            store.store(&payload.task_id, TaskOutcome::Failed(reason));
        }
        TaskState::Completed => {
            let floor = config.callback_confidence_floor;
            let kept: Vec<Prediction> = payload
                .categories
                .into_iter()
                .filter(|c| c.score >= floor)
                .map(Into::into)
                .collect();
            debug!(
                "Storing {} predictions for task {} (floor {})",
                kept.len(),
                payload.task_id,
                floor
            );
            store.store(&payload.task_id, TaskOutcome::Completed(kept));
        }
    }

    HttpResponse::Accepted().json(json!({"status": "received"}))
}

/// Client-facing polling endpoint.
///
/// A task with no stored entry always polls as pending - unknown, in-flight,
/// and lost callbacks all look the same from here. Completed entries are
/// filtered by the resolver-side confidence floor and joined against the
/// catalog.
pub async fn get_task_result(
    path: web::Path<String>,
    catalog: web::Data<Arc<CatalogRegistry>>,
    store: web::Data<Arc<ResultStore>>,
    config: web::Data<Config>,
) -> HttpResponse {
    let task_id = path.into_inner();

    let Some(outcome) = store.get(&task_id) else {
        debug!("Task {} has no stored result yet", task_id);
        return HttpResponse::Accepted().json(json!({"status": "pending"}));
    };

    match outcome {
        TaskOutcome::Failed(reason) => {
            info!("Task {} reported as failed: {}", task_id, reason);
            HttpResponse::Accepted().json(json!({"status": "failed", "error": reason}))
        }
        TaskOutcome::Completed(predictions) => {
            let floor = config.resolver_confidence_floor;
            let labels: Vec<u32> = predictions
                .iter()
                .filter(|p| p.confidence >= floor)
                .map(|p| p.label)
                .collect();
            if labels.is_empty() {
                return HttpResponse::Ok().json(SearchResults::default());
            }
            HttpResponse::Ok().json(catalog.resolve_labels(&labels))
        }
    }
}
