//! Result store port - durable, append-only log of result records.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::SweepResult;
use crate::domain::models::ResultRecord;

/// Append-only result log.
///
/// `append` must not return before the record is durable. Failures are
/// `SweepError::ResultStoreIo` and end the run.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Durably append one record.
    async fn append(&mut self, record: &ResultRecord) -> SweepResult<()>;

    /// Every complete record currently in the log, in log order.
    async fn read_all(&self) -> SweepResult<Vec<ResultRecord>>;

    /// Where the log lives, for messages.
    fn location(&self) -> &Path;
}
