use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;
use uuid::Uuid;

/// Queue name the image-classification workload is routed to.
pub const IMAGE_QUEUE: &str = "image";

/// A unit of work travelling from the submission endpoint to a worker. The
/// task identifier is assigned before enqueueing and is the same one the
/// worker later reports to the callback endpoint.
#[derive(Debug)]
pub struct InferenceJob {
    pub task_id: String,
    pub image_data: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue {0:?} is not declared")]
    UnknownQueue(String),
    #[error("queue {0:?} is closed")]
    Closed(String),
}

/// In-process broker holding the named job queues.
pub struct Broker {
    queues: Mutex<HashMap<String, mpsc::Sender<InferenceJob>>>,
}

impl Broker {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
        }
    }

    /// Declares a bounded queue and hands back its consumer end.
    pub fn declare(&self, name: &str, capacity: usize) -> mpsc::Receiver<InferenceJob> {
        let (tx, rx) = mpsc::channel(capacity);
        self.queues.lock().unwrap().insert(name.to_string(), tx);
        rx
    }

    /// Returns a submission handle for a declared queue.
    pub fn client(&self, name: &str) -> Result<QueueClient, QueueError> {
        let queues = self.queues.lock().unwrap();
        let tx = queues
            .get(name)
            .cloned()
            .ok_or_else(|| QueueError::UnknownQueue(name.to_string()))?;
        Ok(QueueClient {
            queue: name.to_string(),
            tx,
        })
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

/// Submission side of a queue. `submit` assigns the task identifier and
/// enqueues the job without waiting for it to be processed.
#[derive(Clone)]
pub struct QueueClient {
    queue: String,
    tx: mpsc::Sender<InferenceJob>,
}

impl QueueClient {
    pub async fn submit(&self, image_data: Vec<u8>) -> Result<String, QueueError> {
        let task_id = Uuid::new_v4().to_string();
        let job = InferenceJob {
            task_id: task_id.clone(),
            image_data,
        };
        self.tx
            .send(job)
            .await
            .map_err(|_| QueueError::Closed(self.queue.clone()))?;
        Ok(task_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn submitted_job_carries_the_returned_task_id() {
        let broker = Broker::new();
        let mut receiver = broker.declare(IMAGE_QUEUE, 4);
        let client = broker.client(IMAGE_QUEUE).unwrap();

        let task_id = client.submit(vec![1, 2, 3]).await.unwrap();
        let job = receiver.recv().await.unwrap();
        assert_eq!(job.task_id, task_id);
        assert_eq!(job.image_data, vec![1, 2, 3]);
    }

    #[actix_web::test]
    async fn every_submission_gets_a_fresh_task_id() {
        let broker = Broker::new();
        let _receiver = broker.declare(IMAGE_QUEUE, 4);
        let client = broker.client(IMAGE_QUEUE).unwrap();

        let first = client.submit(Vec::new()).await.unwrap();
        let second = client.submit(Vec::new()).await.unwrap();
        assert_ne!(first, second);
    }

    #[actix_web::test]
    async fn client_for_an_undeclared_queue_is_rejected() {
        let broker = Broker::new();
        assert!(matches!(
            broker.client("video"),
            Err(QueueError::UnknownQueue(_))
        ));
    }

    #[actix_web::test]
    async fn submit_fails_once_the_consumer_is_gone() {
        let broker = Broker::new();
        let receiver = broker.declare(IMAGE_QUEUE, 4);
        let client = broker.client(IMAGE_QUEUE).unwrap();
        drop(receiver);

        assert!(matches!(
            client.submit(Vec::new()).await,
            Err(QueueError::Closed(_))
        ));
    }
}
