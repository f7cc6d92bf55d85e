//! Result cache keyed by content fingerprint and data type.
//!
//! With a `path` configured the cache is mirrored to a JSON file, so results
//! survive across processes until their TTL runs out.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use lexicut_error::{CacheError, CacheErrorKind, JsonError, LexicutResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Cache entry with value and expiration.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry {
    value: JsonValue,
    created_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    /// Wall-clock age; zero if the clock went backwards.
    fn age(&self) -> Duration {
        (Utc::now() - self.created_at).to_std().unwrap_or_default()
    }

    /// Check if this entry is expired.
    pub fn is_expired(&self) -> bool {
        self.age() > self.ttl
    }

    /// Get remaining time until expiration.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.age())
    }
}

/// On-disk form of one entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    cid: String,
    data_type: String,
    value: JsonValue,
    created_at: DateTime<Utc>,
    ttl_secs: u64,
}

/// On-disk cache file, entries in least-recently-used-first order.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredCache {
    #[serde(default)]
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    cid: String,
    data_type: String,
}

impl CacheKey {
    fn new(cid: &str, data_type: &str) -> Self {
        Self {
            cid: cid.to_string(),
            data_type: data_type.to_string(),
        }
    }

    fn label(&self) -> String {
        format!("{}/{}", self.cid, self.data_type)
    }
}

/// Configuration for the result cache.
///
/// ```toml
/// [cache]
/// default_ttl = 604800
/// max_size = 500
/// enabled = true
/// # path = "/path/to/cache.json"
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct ResultCacheConfig {
    /// Default TTL for cached entries (seconds)
    #[serde(default = "default_ttl")]
    default_ttl: u64,

    /// Maximum cache size (number of entries)
    #[serde(default = "default_max_size")]
    max_size: usize,

    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    enabled: bool,

    /// File the cache is persisted to; memory only when unset
    #[serde(default)]
    #[builder(default)]
    path: Option<PathBuf>,
}

fn default_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_max_size() -> usize {
    500
}

fn default_enabled() -> bool {
    true
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: default_ttl(),
            max_size: default_max_size(),
            enabled: default_enabled(),
            path: None,
        }
    }
}

/// Collaborator results with TTL expiry and LRU eviction.
///
/// # Example
///
/// ```
/// use lexicut_cache::{ResultCache, ResultCacheConfig};
///
/// let mut cache = ResultCache::new(ResultCacheConfig::default());
/// cache.insert("ab12", "transcription", &vec!["Hello", "world."], None).unwrap();
///
/// let words: Option<Vec<String>> = cache.get("ab12", "transcription").unwrap();
/// assert_eq!(words.unwrap(), vec!["Hello", "world."]);
/// ```
#[derive(Debug)]
pub struct ResultCache {
    config: ResultCacheConfig,
    entries: HashMap<CacheKey, CacheEntry>,
    access_order: Vec<CacheKey>,
}

impl ResultCache {
    /// Create a new cache with configuration.
    ///
    /// When `path` is set and the file exists, its unexpired entries are
    /// loaded. An unreadable file is logged and replaced on the next write.
    pub fn new(config: ResultCacheConfig) -> Self {
        tracing::debug!(
            default_ttl = config.default_ttl,
            max_size = config.max_size,
            enabled = config.enabled,
            path = ?config.path,
            "Creating new ResultCache"
        );
        let mut cache = Self {
            config,
            entries: HashMap::new(),
            access_order: Vec::new(),
        };
        if cache.config.enabled
            && let Some(path) = cache.config.path.clone()
        {
            cache.load(&path);
        }
        cache
    }

    fn load(&mut self, path: &Path) {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot read cache file");
                return;
            }
        };
        let stored: StoredCache = match serde_json::from_slice(&bytes) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt cache file");
                return;
            }
        };

        for stored in stored.entries {
            let key = CacheKey::new(&stored.cid, &stored.data_type);
            let entry = CacheEntry {
                value: stored.value,
                created_at: stored.created_at,
                ttl: Duration::from_secs(stored.ttl_secs),
            };
            if entry.is_expired() {
                continue;
            }
            if self.entries.len() >= self.config.max_size {
                self.evict_lru();
            }
            self.touch(&key);
            self.entries.insert(key, entry);
        }
        tracing::info!(
            path = %path.display(),
            entries = self.entries.len(),
            "Loaded result cache"
        );
    }

    /// Write every entry to the configured file.
    ///
    /// Does nothing for a memory-only cache. The file is written to a temp
    /// path and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns `Persist` if the file cannot be written.
    pub fn persist(&self) -> LexicutResult<()> {
        let Some(path) = &self.config.path else {
            return Ok(());
        };
        let persist_error = |message: String| {
            CacheError::new(CacheErrorKind::Persist {
                path: path.display().to_string(),
                message,
            })
        };

        let stored = StoredCache {
            entries: self
                .access_order
                .iter()
                .filter_map(|key| {
                    let entry = self.entries.get(key)?;
                    Some(StoredEntry {
                        cid: key.cid.clone(),
                        data_type: key.data_type.clone(),
                        value: entry.value.clone(),
                        created_at: entry.created_at,
                        ttl_secs: entry.ttl.as_secs(),
                    })
                })
                .collect(),
        };
        let json = serde_json::to_vec(&stored).map_err(|e| persist_error(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| persist_error(e.to_string()))?;
        }
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, json).map_err(|e| persist_error(e.to_string()))?;
        std::fs::rename(&temp, path).map_err(|e| persist_error(e.to_string()))?;

        tracing::debug!(entries = stored.entries.len(), "Persisted result cache");
        Ok(())
    }

    fn persist_or_warn(&self) {
        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "Result cache not persisted");
        }
    }

    /// Cache a result for `(cid, data_type)`.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the value cannot be serialized, or `Persist`
    /// if the cache file cannot be written.
    #[tracing::instrument(
        skip(self, value),
        fields(cache_size = self.entries.len())
    )]
    pub fn insert<T: Serialize>(
        &mut self,
        cid: &str,
        data_type: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) -> LexicutResult<()> {
        if !self.config.enabled {
            tracing::debug!("Cache disabled, skipping insert");
            return Ok(());
        }

        let value = serde_json::to_value(value)
            .map_err(|e| JsonError::new(format!("Failed to cache {data_type}: {e}")))?;
        let key = CacheKey::new(cid, data_type);
        let ttl = Duration::from_secs(ttl_seconds.unwrap_or(self.config.default_ttl));

        if self.entries.len() >= self.config.max_size && !self.entries.contains_key(&key) {
            self.evict_lru();
        }

        self.touch(&key);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: Utc::now(),
                ttl,
            },
        );
        tracing::debug!(ttl = ?ttl, "Inserted entry into cache");
        self.persist()
    }

    /// Raw entry for `(cid, data_type)`, if present and fresh.
    pub fn get_entry(&mut self, cid: &str, data_type: &str) -> Option<&CacheEntry> {
        if !self.config.enabled {
            return None;
        }

        let key = CacheKey::new(cid, data_type);
        if self.entries.get(&key)?.is_expired() {
            tracing::debug!(key = %key.label(), "Cache entry expired, removing");
            self.remove_key(&key);
            return None;
        }

        self.touch(&key);
        self.entries.get(&key)
    }

    /// Cached result for `(cid, data_type)`, decoded.
    ///
    /// # Errors
    ///
    /// Returns `Decode` if the cached value is not a `T`.
    #[tracing::instrument(skip(self))]
    pub fn get<T: DeserializeOwned>(
        &mut self,
        cid: &str,
        data_type: &str,
    ) -> LexicutResult<Option<T>> {
        let Some(entry) = self.get_entry(cid, data_type) else {
            tracing::debug!("Cache miss");
            return Ok(None);
        };
        let decoded = serde_json::from_value(entry.value.clone()).map_err(|e| {
            CacheError::new(CacheErrorKind::Decode {
                key: format!("{cid}/{data_type}"),
                message: e.to_string(),
            })
        })?;
        tracing::debug!("Cache hit");
        Ok(Some(decoded))
    }

    /// Drop every entry for a fingerprint.
    pub fn invalidate(&mut self, cid: &str) -> usize {
        let keys: Vec<CacheKey> = self
            .entries
            .keys()
            .filter(|key| key.cid == cid)
            .cloned()
            .collect();
        for key in &keys {
            self.remove_key(key);
        }
        if !keys.is_empty() {
            self.persist_or_warn();
        }
        keys.len()
    }

    /// Remove expired entries from cache.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.remove_key(key);
        }
        if !expired.is_empty() {
            tracing::info!(
                removed = expired.len(),
                remaining = self.entries.len(),
                "Cleaned up expired cache entries"
            );
            self.persist_or_warn();
        }
        expired.len()
    }

    /// Clear all cache entries.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.access_order.clear();
        tracing::info!(cleared = count, "Cleared cache");
        self.persist_or_warn();
    }

    /// Get number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
        self.access_order.push(key.clone());
    }

    fn remove_key(&mut self, key: &CacheKey) {
        self.entries.remove(key);
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
    }

    fn evict_lru(&mut self) {
        if let Some(key) = self.access_order.first().cloned() {
            tracing::debug!(key = %key.label(), "Evicting LRU entry");
            self.remove_key(&key);
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(ResultCacheConfig::default())
    }
}
