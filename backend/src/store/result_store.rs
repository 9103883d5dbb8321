use std::collections::HashMap;
use std::sync::RwLock;

use shared::Prediction;

/// Outcome of one classification task, keyed by task identifier. A task with
/// no entry is indistinguishable from one whose callback was lost.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskOutcome {
    Completed(Vec<Prediction>),
    Failed(String),
}

/// Thread-safe, process-lifetime registry of task outcomes. Written by the
/// webhook receiver, read by the result resolver. Entries have no TTL and no
/// persistence; storing under an existing key overwrites the previous entry
/// wholesale.
pub struct ResultStore {
    entries: RwLock<HashMap<String, TaskOutcome>>,
}

#[allow(dead_code)]
impl ResultStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self, task_id: &str, outcome: TaskOutcome) {
        self.entries
            .write()
            .unwrap()
            .insert(task_id.to_string(), outcome);
    }

    pub fn get(&self, task_id: &str) -> Option<TaskOutcome> {
        self.entries.read().unwrap().get(task_id).cloned()
    }

    pub fn has(&self, task_id: &str) -> bool {
        self.entries.read().unwrap().contains_key(task_id)
    }

    pub fn clear(&self, task_id: &str) {
        self.entries.write().unwrap().remove(task_id);
    }

    pub fn clear_all(&self) {
        self.entries.write().unwrap().clear();
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn predictions(labels: &[u32]) -> Vec<Prediction> {
        labels
            .iter()
            .map(|&label| Prediction {
                label,
                confidence: 0.9,
            })
            .collect()
    }

    #[test]
    fn stored_outcomes_can_be_read_back() {
        let store = ResultStore::new();
        assert!(!store.has("a"));
        assert_eq!(store.get("a"), None);

        store.store("a", TaskOutcome::Completed(predictions(&[1, 2])));
        assert!(store.has("a"));
        assert_eq!(
            store.get("a"),
            Some(TaskOutcome::Completed(predictions(&[1, 2])))
        );
    }

    #[test]
    fn rewriting_a_task_id_replaces_the_entry_wholesale() {
        let store = ResultStore::new();
        store.store("a", TaskOutcome::Completed(predictions(&[1])));
        store.store("a", TaskOutcome::Failed("boom".to_string()));
        assert_eq!(store.get("a"), Some(TaskOutcome::Failed("boom".to_string())));
    }

    #[test]
    fn duplicate_deliveries_leave_the_same_final_state() {
        let store = ResultStore::new();
        store.store("a", TaskOutcome::Completed(predictions(&[1, 3])));
        let after_one = store.get("a");
        store.store("a", TaskOutcome::Completed(predictions(&[1, 3])));
        assert_eq!(store.get("a"), after_one);
    }

    #[test]
    fn clear_removes_only_the_named_entry() {
        let store = ResultStore::new();
        store.store("a", TaskOutcome::Completed(Vec::new()));
        store.store("b", TaskOutcome::Completed(Vec::new()));
        store.clear("a");
        assert!(!store.has("a"));
        assert!(store.has("b"));
    }

    #[test]
    fn clear_all_empties_the_store() {
        let store = ResultStore::new();
        store.store("a", TaskOutcome::Completed(Vec::new()));
        store.store("b", TaskOutcome::Failed("x".to_string()));
        store.clear_all();
        assert!(!store.has("a"));
        assert!(!store.has("b"));
    }

    #[test]
    fn concurrent_writers_and_readers_do_not_lose_entries() {
        let store = Arc::new(ResultStore::new());
        let mut handles = Vec::new();
        for writer in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for n in 0..100 {
                    let task_id = format!("task-{}-{}", writer, n);
                    store.store(&task_id, TaskOutcome::Completed(Vec::new()));
                    assert!(store.has(&task_id));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        for writer in 0..8 {
            for n in 0..100 {
                assert!(store.has(&format!("task-{}-{}", writer, n)));
            }
        }
    }
}
