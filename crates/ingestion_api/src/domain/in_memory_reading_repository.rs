use async_trait::async_trait;
use common::domain::{DomainResult, MeterReading, ReadingRepository, StagedReadings};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Reading repository kept in process memory
///
/// A commit appends the whole staged unit under one write lock, so readers
/// never observe a partially committed batch.
#[derive(Clone)]
pub struct InMemoryReadingRepository {
    readings: Arc<RwLock<Vec<MeterReading>>>,
}

impl InMemoryReadingRepository {
    pub fn new() -> Self {
        Self {
            readings: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Committed readings in commit order
    pub async fn snapshot(&self) -> Vec<MeterReading> {
        self.readings.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.readings.read().await.len()
    }
}

impl Default for InMemoryReadingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadingRepository for InMemoryReadingRepository {
    async fn commit_all(&self, staged: StagedReadings) -> DomainResult<bool> {
        if staged.is_empty() {
            return Ok(false);
        }

        let mut readings = self.readings.write().await;
        let staged_count = staged.len();
        readings.extend(staged.into_readings());
        debug!(staged_count, total = readings.len(), "committed staged readings");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::domain::Reading;

    fn staged(values: &[f64]) -> StagedReadings {
        let mut staged = StagedReadings::new();
        for value in values {
            staged.stage(MeterReading::from_reading(
                Reading {
                    customer_id: 3,
                    value: *value,
                    timestamp: Utc::now(),
                },
                Utc::now(),
            ));
        }
        staged
    }

    #[tokio::test]
    async fn test_commit_appends_in_order() {
        let repo = InMemoryReadingRepository::new();
        assert!(repo.commit_all(staged(&[1200.0, 1300.0])).await.unwrap());
        assert!(repo.commit_all(staged(&[1400.0])).await.unwrap());

        let values: Vec<f64> = repo.snapshot().await.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1200.0, 1300.0, 1400.0]);
    }

    #[tokio::test]
    async fn test_empty_commit_writes_nothing() {
        let repo = InMemoryReadingRepository::new();
        assert!(!repo.commit_all(StagedReadings::new()).await.unwrap());
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_commits_stay_whole() {
        let repo = InMemoryReadingRepository::new();
        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            let value = 1000.0 + i as f64;
            handles.push(tokio::spawn(async move {
                repo.commit_all(staged(&[value, value, value])).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().unwrap());
        }

        let committed = repo.snapshot().await;
        assert_eq!(committed.len(), 24);
        for chunk in committed.chunks(3) {
            assert!(chunk.iter().all(|r| r.value == chunk[0].value));
        }
    }
}
