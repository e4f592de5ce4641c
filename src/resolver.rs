//! # Queue Resolution
//!
//! Turns a queue identifier (slug) and environment into a live [`Sink`].
//! Resolution happens once, before any input is read, and the resulting sink
//! is passed by reference into the dispatcher.

use crate::config::{EnqueueConfig, SinkKind};
use crate::constants::MAX_QUEUE_NAME_LENGTH;
use crate::error::{EnqueueError, EnqueueResult};
use crate::sink::{DryRunSink, PgmqSink, Sink};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

/// Resolves `(queue_identifier, environment)` to a sink
#[async_trait]
pub trait SinkResolver: Send + Sync {
    async fn resolve(
        &self,
        queue_identifier: &str,
        environment: &str,
    ) -> EnqueueResult<Box<dyn Sink>>;
}

/// Resolver backed by a loaded [`EnqueueConfig`]
#[derive(Debug, Clone)]
pub struct QueueResolver {
    config: EnqueueConfig,
    dry_run: bool,
    create_if_missing: bool,
}

impl QueueResolver {
    pub fn new(config: EnqueueConfig) -> Self {
        let dry_run = config.sink.kind == SinkKind::DryRun;
        let create_if_missing = config.queues.create_if_missing;
        Self {
            config,
            dry_run,
            create_if_missing,
        }
    }

    /// Force the dry-run sink regardless of configuration
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = self.dry_run || dry_run;
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = self.create_if_missing || create;
        self
    }

    pub fn config(&self) -> &EnqueueConfig {
        &self.config
    }

    /// Queue name for a slug, validated against pgmq naming rules
    pub fn queue_name(&self, queue_identifier: &str) -> Result<String, String> {
        if queue_identifier.trim().is_empty() {
            return Err("queue identifier is empty".to_string());
        }
        validate_queue_name(&self.config.queues.queue_name_for(queue_identifier))
    }

    async fn resolve_pgmq(
        &self,
        queue_identifier: &str,
        environment: &str,
        queue_name: String,
    ) -> EnqueueResult<Box<dyn Sink>> {
        let fail = |reason: String| EnqueueError::resolution(queue_identifier, environment, reason);

        let database_url = self.config.database.url.as_deref().ok_or_else(|| {
            fail("database.url is not configured (set DATABASE_URL or the environment overlay)".to_string())
        })?;

        debug!(
            queue = %queue_name,
            max_connections = self.config.database.max_connections,
            "Connecting to pgmq database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(self.config.database.max_connections)
            .acquire_timeout(self.config.database.acquire_timeout())
            .connect(database_url)
            .await
            .map_err(|e| fail(format!("database connection failed: {e}")))?;

        let exists = PgmqSink::queue_exists(&pool, &queue_name)
            .await
            .map_err(|e| fail(e.to_string()))?;

        if !exists {
            if self.create_if_missing {
                PgmqSink::create_queue(&pool, &queue_name)
                    .await
                    .map_err(|e| fail(e.to_string()))?;
            } else {
                return Err(fail(format!("queue '{queue_name}' does not exist")));
            }
        }

        let sink = PgmqSink::new(pool, queue_name).with_delay_seconds(self.config.queues.delay_seconds);
        info!(
            queue = %sink.queue_name(),
            run_id = %sink.run_id(),
            "✅ Resolved pgmq queue"
        );
        Ok(Box::new(sink))
    }
}

#[async_trait]
impl SinkResolver for QueueResolver {
    async fn resolve(
        &self,
        queue_identifier: &str,
        environment: &str,
    ) -> EnqueueResult<Box<dyn Sink>> {
        if !environment.eq_ignore_ascii_case(&self.config.environment) {
            return Err(EnqueueError::resolution(
                queue_identifier,
                environment,
                format!(
                    "configuration was loaded for environment '{}'",
                    self.config.environment
                ),
            ));
        }

        let queue_name = self
            .queue_name(queue_identifier)
            .map_err(|reason| EnqueueError::resolution(queue_identifier, environment, reason))?;

        if self.dry_run {
            info!(queue = %queue_name, "Dry run: batches will be written to stdout");
            return Ok(Box::new(DryRunSink::stdout(queue_name)));
        }

        self.resolve_pgmq(queue_identifier, environment, queue_name)
            .await
    }
}

/// Check a queue name against pgmq rules: ASCII alphanumerics and `_`, at
/// most [`MAX_QUEUE_NAME_LENGTH`] characters.
pub fn validate_queue_name(queue_name: &str) -> Result<String, String> {
    if queue_name.is_empty() {
        return Err("queue name is empty".to_string());
    }

    if queue_name.len() > MAX_QUEUE_NAME_LENGTH {
        return Err(format!(
            "queue name '{queue_name}' is {} characters, maximum is {MAX_QUEUE_NAME_LENGTH}",
            queue_name.len()
        ));
    }

    if let Some(bad) = queue_name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(format!(
            "queue name '{queue_name}' contains invalid character {bad:?}"
        ));
    }

    Ok(queue_name.to_string())
}
