pub mod postprocess;
pub mod preprocess;

use std::sync::Mutex;

use ndarray::CowArray;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use shared::Prediction;

/// Number of predictions reported per image.
pub const TOP_K: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to load model: {0}")]
    ModelLoad(#[source] ort::Error),
    #[error("inference failed: {0}")]
    Inference(#[source] ort::Error),
    #[error("model returned no output tensor")]
    MissingOutput,
}

/// Classification model session, loaded once per process and shared by the
/// sync endpoint and every worker. Concurrent calls serialize on the mutex.
pub struct ClassificationEngine {
    session: Mutex<Session>,
}

impl ClassificationEngine {
    pub fn load(model_path: &str) -> Result<Self, EngineError> {
        let session = SessionBuilder::new()
            .and_then(|builder| {
                builder.with_execution_providers([CPUExecutionProvider::default().build()])
            })
            .and_then(|builder| builder.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|builder| builder.commit_from_file(model_path))
            .map_err(EngineError::ModelLoad)?;
        Ok(Self {
            session: Mutex::new(session),
        })
    }

    /// Runs one forward pass over the uploaded bytes and returns the top
    /// predictions in descending confidence order.
    pub fn classify(&self, image_data: &[u8]) -> Result<Vec<Prediction>, EngineError> {
        let input = CowArray::from(preprocess::image_to_tensor(image_data).into_dyn());

        let session = self.session.lock().unwrap();
        let inputs = ort::inputs![input.view()].map_err(EngineError::Inference)?;
        let outputs = session.run(inputs).map_err(EngineError::Inference)?;
        let (_, value) = outputs.iter().next().ok_or(EngineError::MissingOutput)?;
        let scores: Vec<f32> = value
            .try_extract_tensor::<f32>()
            .map_err(EngineError::Inference)?
            .iter()
            .copied()
            .collect();

        Ok(postprocess::top_predictions(&scores, TOP_K))
    }
}
