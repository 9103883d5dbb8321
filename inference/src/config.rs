use std::env;

/// Runtime configuration for the inference service, read from the
/// environment once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub model_path: String,
    pub callback_url: String,
    pub worker_count: usize,
    pub queue_capacity: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        Self {
            bind_address: format!("0.0.0.0:{}", port),
            model_path: env::var("MODEL_PATH").unwrap_or_else(|_| "squeezenet.onnx".to_string()),
            callback_url: env::var("BACKEND_WEBHOOK_URL")
                .unwrap_or_else(|_| "http://localhost:8000/webhook/task_completed".to_string()),
            worker_count: env::var("WORKER_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            queue_capacity: env::var("QUEUE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64),
        }
    }
}
