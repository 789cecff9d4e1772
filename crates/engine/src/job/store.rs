//! 작업 저장소
//!
//! [`JobStore`]는 작업 레코드의 보관을 추상화합니다. 기본 구현은
//! [`InMemoryJobStore`]이며, 프로세스가 종료되면 모든 작업이 사라집니다.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::RwLock;

use super::ScanJob;

/// 작업 저장소 trait
///
/// `update`는 레코드 하나를 잠금 안에서 변경하므로 상태와 보고서가 한 번에 반영됩니다.
/// 폴링하는 쪽은 `completed`와 `result`가 어긋난 중간 상태를 볼 수 없습니다.
pub trait JobStore: Send + Sync + 'static {
    /// 작업을 저장합니다. 같은 ID가 있으면 교체합니다.
    fn insert(&self, job: ScanJob) -> impl Future<Output = ()> + Send;

    /// 작업 스냅샷을 반환합니다.
    fn get(&self, id: &str) -> impl Future<Output = Option<ScanJob>> + Send;

    /// 작업을 제자리에서 변경합니다. 작업이 없으면 `false`를 반환합니다.
    fn update<F>(&self, id: &str, f: F) -> impl Future<Output = bool> + Send
    where
        F: FnOnce(&mut ScanJob) + Send;

    /// 작업을 제거하고 반환합니다.
    fn remove(&self, id: &str) -> impl Future<Output = Option<ScanJob>> + Send;

    /// 모든 작업의 스냅샷
    fn list(&self) -> impl Future<Output = Vec<ScanJob>> + Send;

    /// 보관 중인 작업 수
    fn len(&self) -> impl Future<Output = usize> + Send;

    /// 저장소가 비어 있는지 여부
    fn is_empty(&self) -> impl Future<Output = bool> + Send {
        async { self.len().await == 0 }
    }
}

/// 프로세스 메모리 작업 저장소
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, ScanJob>>,
}

impl InMemoryJobStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: ScanJob) {
        self.jobs.write().await.insert(job.id.clone(), job);
    }

    async fn get(&self, id: &str) -> Option<ScanJob> {
        self.jobs.read().await.get(id).cloned()
    }

    async fn update<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut ScanJob) + Send,
    {
        match self.jobs.write().await.get_mut(id) {
            Some(job) => {
                f(job);
                true
            }
            None => false,
        }
    }

    async fn remove(&self, id: &str) -> Option<ScanJob> {
        self.jobs.write().await.remove(id)
    }

    async fn list(&self) -> Vec<ScanJob> {
        self.jobs.read().await.values().cloned().collect()
    }

    async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;
    use crate::types::{Ecosystem, ScanRequest};

    fn job(id: &str) -> ScanJob {
        ScanJob::new(
            id,
            ScanRequest::Package {
                ecosystem: Ecosystem::PyPi,
                package: "requests".to_owned(),
                version: None,
                deep: false,
            },
        )
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let store = InMemoryJobStore::new();
        store.insert(job("a")).await;
        store.insert(job("b")).await;
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("a").await.unwrap().id, "a");

        let removed = store.remove("a").await.unwrap();
        assert_eq!(removed.id, "a");
        assert!(store.get("a").await.is_none());
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn update_mutates_in_place() {
        let store = InMemoryJobStore::new();
        store.insert(job("a")).await;

        let updated = store
            .update("a", |j| {
                j.status = JobStatus::Error;
                j.error = Some("boom".to_owned());
            })
            .await;
        assert!(updated);

        let stored = store.get("a").await.unwrap();
        assert_eq!(stored.status, JobStatus::Error);
        assert_eq!(stored.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn update_missing_job_returns_false() {
        let store = InMemoryJobStore::new();
        assert!(!store.update("missing", |_| {}).await);
    }
}
