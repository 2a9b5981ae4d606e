//! Per-domain configuration structs
//!
//! One typed struct per domain; `Default` carries the template values the
//! synthesizer starts from. Wire names are camelCase to match the stored
//! configuration format.

use serde::{Deserialize, Serialize};

/// Request rate limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    /// Sustained requests per minute
    pub requests_per_minute: u32,
    /// Short burst allowance
    pub burst_size: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst_size: 10,
        }
    }
}

/// Retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Maximum attempts including the first
    pub max_attempts: u32,
    /// Backoff between attempts, in seconds
    pub backoff_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_secs: 5,
        }
    }
}

/// AI compute engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeEnginesConfig {
    /// Preferred provider
    pub default_provider: String,
    /// Provider used when the default is unavailable
    pub fallback_provider: Option<String>,
    /// Rate limiting knobs
    pub rate_limiting: RateLimit,
    /// Retry policy for provider calls
    pub retry: RetryPolicy,
    /// Whether streaming responses are requested
    pub streaming: bool,
}

impl Default for ComputeEnginesConfig {
    fn default() -> Self {
        Self {
            default_provider: "openai".to_string(),
            fallback_provider: Some("anthropic".to_string()),
            rate_limiting: RateLimit::default(),
            retry: RetryPolicy::default(),
            streaming: true,
        }
    }
}

/// Replication settings for storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationSettings {
    /// Whether replication is enabled
    pub enabled: bool,
    /// Replication factor
    pub factor: u32,
}

impl Default for ReplicationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            factor: 2,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Primary backend name
    pub primary_backend: String,
    /// Optional secondary backend
    pub secondary_backend: Option<String>,
    /// Replication settings
    pub replication: ReplicationSettings,
    /// Whether sharding is enabled
    pub sharding_enabled: bool,
    /// Whether reads are offloaded to a CDN-like secondary store
    pub cdn_offload: bool,
    /// Maximum object size, in MiB
    pub max_object_mb: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            primary_backend: "local".to_string(),
            secondary_backend: None,
            replication: ReplicationSettings::default(),
            sharding_enabled: false,
            cdn_offload: false,
            max_object_mb: 64,
        }
    }
}

/// Memory / caching layer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfig {
    /// Backing store (`local` or `distributed`), kept consistent with the
    /// storage domain by the optimizer
    pub storage_backend: String,
    /// Maximum cached entries
    pub max_entries: u64,
    /// Entry time-to-live, in seconds
    pub ttl_secs: u64,
    /// Eviction strategy
    pub eviction: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            storage_backend: "local".to_string(),
            max_entries: 10_000,
            ttl_secs: 86_400,
            eviction: "lru".to_string(),
        }
    }
}

/// Workflow execution configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Maximum workflow executions running at once
    pub max_concurrent_executions: u32,
    /// Default per-execution timeout, in seconds
    pub default_timeout_secs: u64,
    /// Retry policy for failed steps
    pub retry: RetryPolicy,
    /// Days of execution history to retain
    pub history_retention_days: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_concurrent_executions: 5,
            default_timeout_secs: 300,
            retry: RetryPolicy {
                max_attempts: 3,
                backoff_secs: 10,
            },
            history_retention_days: 30,
        }
    }
}

/// Authentication settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    /// JWT lifetime, in seconds
    pub jwt_expiry: u64,
    /// Whether refresh tokens are issued
    pub refresh_enabled: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_expiry: 604_800,
            refresh_enabled: true,
        }
    }
}

/// Encryption settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionSettings {
    /// Algorithm name; `None` means encryption at rest is disabled
    pub algorithm: Option<String>,
    /// Key rotation interval, in days
    #[serde(default = "default_key_rotation_days")]
    pub key_rotation_days: u32,
}

fn default_key_rotation_days() -> u32 {
    90
}

/// Security configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    /// Authentication settings
    pub authentication: AuthSettings,
    /// Encryption settings
    pub encryption: EncryptionSettings,
    /// Concurrent sessions allowed per user
    pub max_sessions_per_user: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            authentication: AuthSettings::default(),
            encryption: EncryptionSettings {
                algorithm: None,
                key_rotation_days: 90,
            },
            max_sessions_per_user: 10,
        }
    }
}

/// Peer networking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Whether transport encryption is required
    pub encryption: bool,
    /// Seed peers contacted at startup
    pub bootstrap_peers: Vec<String>,
    /// Maximum connected peers
    pub max_peers: u32,
    /// Whether automatic peer discovery runs
    pub discovery_enabled: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            encryption: false,
            bootstrap_peers: Vec::new(),
            max_peers: 25,
            discovery_enabled: true,
        }
    }
}
