use std::{env, str::FromStr, time::Duration};

use partnerbook_core::storage::{MalformedItemPolicy, WriteMode};

use crate::storage::dynamodb::BatchRetryConfig;

/// Which item store backs the partner repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    DynamoDb,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dynamodb" => Ok(Self::DynamoDb),
            "memory" | "inmemory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend (default: dynamodb)
    pub storage_backend: StorageBackend,
    /// DynamoDB table name (default: "partnerbook")
    pub table_name: String,
    /// Endpoint override for DynamoDB Local or LocalStack
    pub endpoint_url: Option<String>,
    /// Strongly consistent partition reads (default: false)
    pub consistent_read: bool,
    /// How a partner and its children are written (default: batch)
    pub write_mode: WriteMode,
    /// What reads do with records that fail to decode (default: fail)
    pub malformed_item_policy: MalformedItemPolicy,
    /// Resubmissions of unprocessed batch items (default: 5)
    pub batch_write_max_retries: usize,
    /// First backoff delay in milliseconds (default: 100)
    pub batch_write_initial_delay_ms: u64,
    /// Backoff cap in milliseconds (default: 2000)
    pub batch_write_max_delay_ms: u64,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STORAGE_BACKEND` - `dynamodb` or `memory` (default: dynamodb)
    /// - `DYNAMODB_TABLE_NAME` - Table name (default: "partnerbook")
    /// - `DYNAMODB_ENDPOINT_URL` - Endpoint override (default: unset)
    /// - `DYNAMODB_CONSISTENT_READ` - `true` or `false` (default: false)
    /// - `PARTNER_WRITE_MODE` - `batch` or `transactional` (default: batch)
    /// - `MALFORMED_ITEM_POLICY` - `fail` or `skip` (default: fail)
    /// - `BATCH_WRITE_MAX_RETRIES` - Retry count (default: 5)
    /// - `BATCH_WRITE_INITIAL_DELAY_MS` - First delay (default: 100)
    /// - `BATCH_WRITE_MAX_DELAY_MS` - Delay cap (default: 2000)
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout (default: 10)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            storage_backend: lookup("STORAGE_BACKEND")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            table_name: lookup("DYNAMODB_TABLE_NAME").unwrap_or_else(|| "partnerbook".to_string()),
            endpoint_url: lookup("DYNAMODB_ENDPOINT_URL").filter(|v| !v.is_empty()),
            consistent_read: lookup("DYNAMODB_CONSISTENT_READ")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(false),
            write_mode: lookup("PARTNER_WRITE_MODE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            malformed_item_policy: lookup("MALFORMED_ITEM_POLICY")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            batch_write_max_retries: lookup("BATCH_WRITE_MAX_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            batch_write_initial_delay_ms: lookup("BATCH_WRITE_INITIAL_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            batch_write_max_delay_ms: lookup("BATCH_WRITE_MAX_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            request_timeout_seconds: lookup("REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Backoff settings for unprocessed batch items.
    pub fn batch_retry(&self) -> BatchRetryConfig {
        BatchRetryConfig {
            max_retries: self.batch_write_max_retries,
            initial_delay: Duration::from_millis(self.batch_write_initial_delay_ms),
            max_delay: Duration::from_millis(self.batch_write_max_delay_ms),
        }
    }

    /// Get request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
