use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use shared::{Prediction, TaskCallback, TaskState};
use tokio::sync::{Mutex, mpsc};

use super::broker::InferenceJob;
use crate::engine::ClassificationEngine;

/// Webhook request timeout.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Reports task outcomes to the backend webhook. Delivery is best-effort:
/// one POST per outcome, no retry. A lost delivery leaves the task polling
/// as pending forever.
#[derive(Clone)]
pub struct CallbackReporter {
    http: reqwest::Client,
    callback_url: String,
}

impl CallbackReporter {
    pub fn new(callback_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            callback_url,
        }
    }

    pub async fn report(&self, payload: &TaskCallback) {
        let delivery = self
            .http
            .post(&self.callback_url)
            .timeout(CALLBACK_TIMEOUT)
            .json(payload)
            .send()
            .await;

        match delivery {
            Ok(response) if response.status().is_success() => {
                debug!("Callback delivered for task {}", payload.task_id);
            }
            Ok(response) => {
                error!(
                    "Callback for task {} rejected with status {}",
                    payload.task_id,
                    response.status()
                );
            }
            Err(e) => {
                error!("Callback delivery failed for task {}: {}", payload.task_id, e);
            }
        }
    }
}

/// Builds the callback body for a successful classification.
pub fn completed_payload(task_id: &str, predictions: &[Prediction]) -> TaskCallback {
    TaskCallback {
        task_id: task_id.to_string(),
        state: TaskState::Completed,
        categories: predictions.iter().cloned().map(Into::into).collect(),
        error: None,
    }
}

/// Builds the callback body for a failed classification.
pub fn failed_payload(task_id: &str, error: &str) -> TaskCallback {
    TaskCallback {
        task_id: task_id.to_string(),
        state: TaskState::Failed,
        categories: Vec::new(),
        error: Some(error.to_string()),
    }
}

/// Starts `count` workers draining the queue. Each worker runs the engine on
/// the job payload and reports the outcome, success or failure, to the
/// callback endpoint.
pub fn spawn(
    count: usize,
    receiver: mpsc::Receiver<InferenceJob>,
    engine: Arc<ClassificationEngine>,
    reporter: CallbackReporter,
) {
    let receiver = Arc::new(Mutex::new(receiver));
    for worker_id in 0..count {
        let receiver = receiver.clone();
        let engine = engine.clone();
        let reporter = reporter.clone();

        actix_web::rt::spawn(async move {
            loop {
                let job = receiver.lock().await.recv().await;
                let Some(job) = job else {
                    info!("Worker {} stopping, queue closed", worker_id);
                    break;
                };
                debug!("Worker {} picked up task {}", worker_id, job.task_id);

                let payload = match engine.classify(&job.image_data) {
                    Ok(predictions) => completed_payload(&job.task_id, &predictions),
                    Err(e) => {
                        error!("Inference failed for task {}: {}", job.task_id, e);
                        failed_payload(&job.task_id, &e.to_string())
                    }
                };
                reporter.report(&payload).await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_payload_maps_confidence_to_score() {
        let predictions = vec![
            Prediction {
                label: 1,
                confidence: 0.95,
            },
            Prediction {
                label: 3,
                confidence: 0.2,
            },
        ];
        let payload = completed_payload("task-1", &predictions);

        assert_eq!(payload.task_id, "task-1");
        assert_eq!(payload.state, TaskState::Completed);
        assert!(payload.error.is_none());
        assert_eq!(payload.categories.len(), 2);
        assert_eq!(payload.categories[0].label, 1);
        assert_eq!(payload.categories[0].score, 0.95);
    }

    #[test]
    fn failed_payload_has_error_and_no_categories() {
        let payload = failed_payload("task-2", "boom");

        assert_eq!(payload.state, TaskState::Failed);
        assert!(payload.categories.is_empty());
        assert_eq!(payload.error.as_deref(), Some("boom"));
    }

    #[test]
    fn callback_wire_format_matches_the_webhook_contract() {
        let payload = completed_payload(
            "task-3",
            &[Prediction {
                label: 2,
                confidence: 0.5,
            }],
        );
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["state"], "completed");
        assert_eq!(json["categories"][0]["label"], 2);
        assert!(json["categories"][0]["score"].is_number());
        assert!(json.get("error").is_none());
    }
}
