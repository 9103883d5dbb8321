use std::env;

/// Runtime configuration for the search service, read from the environment
/// once at startup. The two confidence floors are separate knobs: one is
/// applied when a callback is stored, the other when a result is read.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: String,
    pub inference_url: String,
    pub callback_confidence_floor: f32,
    pub resolver_confidence_floor: f32,
    pub catalog_data_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
        Self {
            bind_address: format!("0.0.0.0:{}", port),
            inference_url: env::var("INFERENCE_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            callback_confidence_floor: env::var("CALLBACK_CONFIDENCE_FLOOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.1),
            resolver_confidence_floor: env::var("RESOLVER_CONFIDENCE_FLOOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.5),
            catalog_data_dir: env::var("CATALOG_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        }
    }
}
