//! # PostgreSQL Message Queue Sink
//!
//! Writes each batch with a single `pgmq.send_batch` call so a batch is
//! either fully enqueued or not at all.

use super::{Sink, SinkError, SinkResult};
use crate::constants::sinks;
use crate::types::Batch;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Queue message written for every item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMessage {
    pub item_name: String,
    pub metadata: ItemMessageMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMessageMetadata {
    pub enqueued_at: DateTime<Utc>,
    /// Shared by every message of one invocation
    pub run_id: Uuid,
    pub batch_number: u64,
}

#[derive(Debug, Clone)]
pub struct PgmqSink {
    pool: PgPool,
    queue_name: String,
    delay_seconds: i32,
    run_id: Uuid,
}

impl PgmqSink {
    /// Wrap an existing pool; the queue is expected to exist already
    pub fn new(pool: PgPool, queue_name: impl Into<String>) -> Self {
        Self {
            pool,
            queue_name: queue_name.into(),
            delay_seconds: 0,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn with_delay_seconds(mut self, delay_seconds: i32) -> Self {
        self.delay_seconds = delay_seconds;
        self
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Whether pgmq knows a queue with this name
    pub async fn queue_exists(pool: &PgPool, queue_name: &str) -> SinkResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM pgmq.meta WHERE queue_name = $1)",
        )
        .bind(queue_name)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Create the queue; pgmq treats an existing queue as success
    pub async fn create_queue(pool: &PgPool, queue_name: &str) -> SinkResult<()> {
        debug!("📋 Creating queue: {}", queue_name);

        sqlx::query("SELECT pgmq.create($1)")
            .bind(queue_name)
            .execute(pool)
            .await
            .map_err(|e| SinkError::queue_operation(queue_name, "create", e.to_string()))?;

        info!("Queue created: {}", queue_name);
        Ok(())
    }

    fn messages_for(&self, batch: &Batch) -> SinkResult<Vec<serde_json::Value>> {
        let enqueued_at = Utc::now();
        batch
            .iter()
            .map(|item| {
                let message = ItemMessage {
                    item_name: item.as_str().to_string(),
                    metadata: ItemMessageMetadata {
                        enqueued_at,
                        run_id: self.run_id,
                        batch_number: batch.number(),
                    },
                };
                serde_json::to_value(message).map_err(SinkError::from)
            })
            .collect()
    }
}

#[async_trait]
impl Sink for PgmqSink {
    fn describe(&self) -> String {
        format!("{}:{}", sinks::PGMQ, self.queue_name)
    }

    #[instrument(skip(self, batch), fields(queue = %self.queue_name, batch_number = batch.number(), item_count = batch.len()))]
    async fn enqueue(&self, batch: Batch) -> SinkResult<()> {
        let messages = self.messages_for(&batch)?;

        debug!("📤 Sending batch to queue: {}", self.queue_name);

        let message_ids: Vec<i64> =
            sqlx::query_scalar("SELECT * FROM pgmq.send_batch($1, $2::jsonb[], $3)")
                .bind(&self.queue_name)
                .bind(&messages)
                .bind(self.delay_seconds)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    SinkError::queue_operation(&self.queue_name, "send_batch", e.to_string())
                })?;

        if message_ids.len() != messages.len() {
            return Err(SinkError::queue_operation(
                &self.queue_name,
                "send_batch",
                format!(
                    "expected {} message ids, got {}",
                    messages.len(),
                    message_ids.len()
                ),
            ));
        }

        info!(
            first_message_id = message_ids.first().copied(),
            last_message_id = message_ids.last().copied(),
            "Batch enqueued"
        );
        Ok(())
    }
}
