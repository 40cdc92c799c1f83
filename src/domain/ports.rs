use crate::domain::model::{Table, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 時間來源。每次呼叫 `now` 都必須重新取樣
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Table>;
    async fn transform(&self, data: Table) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
