use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Characters sent to the LLM for one successful categorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub characters: u64,
    pub model: String,
    pub template_id: String,
}

/// Sink for LLM usage accounting
#[async_trait]
pub trait UsageTracker: Send + Sync {
    async fn record_usage(&self, record: UsageRecord) -> anyhow::Result<()>;
}

/// Discards usage records
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUsageTracker;

#[async_trait]
impl UsageTracker for NoopUsageTracker {
    async fn record_usage(&self, _record: UsageRecord) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Emits usage as structured log events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUsageTracker;

#[async_trait]
impl UsageTracker for TracingUsageTracker {
    async fn record_usage(&self, record: UsageRecord) -> anyhow::Result<()> {
        info!(
            characters = record.characters,
            model = %record.model,
            template_id = %record.template_id,
            "LLM categorization usage"
        );
        Ok(())
    }
}

/// Running totals kept in memory
#[derive(Debug, Default)]
pub struct InMemoryUsageTracker {
    calls: AtomicU64,
    characters: AtomicU64,
}

impl InMemoryUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn characters(&self) -> u64 {
        self.characters.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UsageTracker for InMemoryUsageTracker {
    async fn record_usage(&self, record: UsageRecord) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.characters.fetch_add(record.characters, Ordering::Relaxed);
        Ok(())
    }
}
