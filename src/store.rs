use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::types::{Batch, UploadResult};

/// Upload batches kept for the lifetime of the server, keyed by batch id.
/// The most recently stored batch is the "current" one.
pub struct ResultStore {
    inner: RwLock<Inner>,
    capacity: usize,
}

#[derive(Default)]
struct Inner {
    batches: HashMap<Uuid, Batch>,
    // oldest first; the back is the latest batch
    order: VecDeque<Uuid>,
}

impl ResultStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Stores `batch` as the latest, evicting the oldest beyond capacity.
    pub async fn insert(&self, batch: Batch) {
        let mut inner = self.inner.write().await;
        let id = batch.id;
        inner.batches.insert(id, batch);
        inner.order.push_back(id);

        while inner.order.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.batches.remove(&evicted);
                log::debug!("Evicted upload batch {}", evicted);
            }
        }
    }

    /// Results of the latest batch, or an empty list before any upload.
    pub async fn latest(&self) -> Vec<UploadResult> {
        let inner = self.inner.read().await;
        inner
            .order
            .back()
            .and_then(|id| inner.batches.get(id))
            .map(|batch| batch.results.clone())
            .unwrap_or_default()
    }

    pub async fn get(&self, id: &Uuid) -> Option<Batch> {
        self.inner.read().await.batches.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.batches.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ResultStatus;

    fn result(filename: &str) -> UploadResult {
        UploadResult {
            filename: filename.to_string(),
            extracted_text: String::new(),
            entities: None,
            pdf_url: format!("/uploads/{}", filename),
            status: ResultStatus::NoMatch,
            error: None,
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = ResultStore::new(4);
        assert!(store.is_empty().await);
        assert!(store.latest().await.is_empty());
        assert!(store.get(&Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_latest_replaces_previous_batch() {
        let store = ResultStore::new(4);
        let first = Batch::new(vec![result("a.pdf"), result("b.pdf")]);
        let first_id = first.id;
        store.insert(first).await;
        store.insert(Batch::new(vec![result("c.pdf")])).await;

        let latest = store.latest().await;
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].filename, "c.pdf");

        let earlier = store.get(&first_id).await.unwrap();
        let names: Vec<_> = earlier.results.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_oldest_batches_evicted() {
        let store = ResultStore::new(2);
        let first = Batch::new(vec![result("a.pdf")]);
        let first_id = first.id;
        store.insert(first).await;
        store.insert(Batch::new(vec![result("b.pdf")])).await;
        store.insert(Batch::new(vec![result("c.pdf")])).await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(&first_id).await.is_none());
        assert_eq!(store.latest().await[0].filename, "c.pdf");
    }
}
