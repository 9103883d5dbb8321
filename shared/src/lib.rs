use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// A single classification emitted by the inference engine. Labels are the
/// 1-based category identifiers shared with the catalog.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: u32,
    pub confidence: f32,
}

/// Wire form of a prediction inside a task callback.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScoredCategory {
    pub label: u32,
    pub score: f32,
}

impl From<Prediction> for ScoredCategory {
    fn from(p: Prediction) -> Self {
        Self {
            label: p.label,
            score: p.confidence,
        }
    }
}

impl From<ScoredCategory> for Prediction {
    fn from(c: ScoredCategory) -> Self {
        Self {
            label: c.label,
            confidence: c.score,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskState {
    Completed,
    Failed,
}

/// Outcome report a worker POSTs to the backend webhook. `categories` is
/// empty for failed tasks, `error` absent for completed ones.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TaskCallback {
    pub task_id: String,
    pub state: TaskState,
    #[serde(default)]
    pub categories: Vec<ScoredCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Handle returned by the asynchronous submission endpoints.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TaskSubmitted {
    pub task_id: String,
}

/// Response body of the synchronous inference endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SyncClassification {
    pub category: Vec<Prediction>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CategorySummary {
    pub id: u32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProductSummary {
    pub id: u32,
    pub name: String,
    pub price: f64,
}

/// Categories and products resolved for a search or a completed task.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SearchResults {
    pub categories: Vec<String>,
    pub products: Vec<ProductSummary>,
}
