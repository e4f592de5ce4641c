//! # System Constants
//!
//! Operational boundaries shared by the reader, dispatcher, resolver and
//! configuration layers.

/// Number of items accumulated before a batch is flushed to the sink.
pub const DEFAULT_BATCH_CAPACITY: usize = 10_000;

/// Environment selected when none is given on the command line.
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Environments that resolve without an overlay file in the config directory.
pub const BUILTIN_ENVIRONMENTS: [&str; 3] = ["production", "development", "test"];

/// Queue naming pattern; `{slug}` is replaced by the queue identifier.
pub const DEFAULT_QUEUE_NAMING_PATTERN: &str = "{slug}_queue";

/// Placeholder substituted in [`DEFAULT_QUEUE_NAMING_PATTERN`]-style patterns.
pub const SLUG_PLACEHOLDER: &str = "{slug}";

/// pgmq rejects queue names longer than this.
pub const MAX_QUEUE_NAME_LENGTH: usize = 47;

/// Upper bound on the per-batch vector preallocation.
pub const MAX_BATCH_PREALLOCATION: usize = DEFAULT_BATCH_CAPACITY;

/// Environment variable naming the configuration directory.
pub const CONFIG_DIR_ENV: &str = "ENQUEUE_CONFIG_DIR";

/// Prefix for `config`-crate environment overrides (`ENQUEUE__BATCH__CAPACITY`).
pub const CONFIG_ENV_PREFIX: &str = "ENQUEUE";

pub mod sinks {
    pub const PGMQ: &str = "pgmq";
    pub const DRY_RUN: &str = "dry_run";
    pub const MEMORY: &str = "memory";
}
