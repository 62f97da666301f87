//! Entity aggregation with a walk-once cache.
//!
//! The first request resolves levels, walks them and groups the cells by
//! block. The result (or the failure, depending on [`FailurePolicy`]) is kept
//! for every later request. Callers arriving while a walk is in flight wait on
//! the cache lock and observe the same result; the walker runs once.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::cancel::CancellationToken;
use crate::caption::CaptionStrategy;
use crate::config::FailurePolicy;
use crate::error::{ExplorerError, Result};
use crate::levels::resolve_levels;
use crate::types::{BlockGroups, FileRecord};
use crate::walker::SharedWalker;

#[derive(Debug)]
enum AggregationCache {
    Unresolved,
    Resolved(Arc<BlockGroups>),
    Failed { error: ExplorerError, at: Instant },
}

/// Observable cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Unresolved,
    /// A walk is in flight.
    Resolving,
    Resolved,
    Failed,
}

impl CacheState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::Resolving => "resolving",
            Self::Resolved => "resolved",
            Self::Failed => "failed",
        }
    }
}

impl FailurePolicy {
    fn retains(self, failed_at: Instant) -> bool {
        match self {
            Self::Permanent => true,
            Self::RetryAfter(ttl) => failed_at.elapsed() < ttl,
            Self::Never => false,
        }
    }
}

pub struct EntityAggregator {
    root: PathBuf,
    walker: SharedWalker,
    captions: CaptionStrategy,
    failure_policy: FailurePolicy,
    cache: Mutex<AggregationCache>,
}

impl std::fmt::Debug for EntityAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityAggregator")
            .field("root", &self.root)
            .field("walker", &"<walker>")
            .field("captions", &self.captions)
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl EntityAggregator {
    pub fn new(
        root: PathBuf,
        walker: SharedWalker,
        captions: CaptionStrategy,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            root,
            walker,
            captions,
            failure_policy,
            cache: Mutex::new(AggregationCache::Unresolved),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> CacheState {
        match self.cache.try_lock() {
            Err(_) => CacheState::Resolving,
            Ok(cache) => match &*cache {
                AggregationCache::Unresolved => CacheState::Unresolved,
                AggregationCache::Resolved(_) => CacheState::Resolved,
                AggregationCache::Failed { .. } => CacheState::Failed,
            },
        }
    }

    /// Returns the block groups, walking `levels` on the first call only.
    ///
    /// Once a walk has settled, `levels` is ignored. An empty level set
    /// resolves to empty groups without touching the walker or the cache.
    pub async fn get_entities<S: AsRef<str>>(
        &self,
        levels: &[S],
        cancel: &CancellationToken,
    ) -> Result<Arc<BlockGroups>> {
        let mut cache = self.cache.lock().await;
        match &*cache {
            AggregationCache::Resolved(groups) => return Ok(groups.clone()),
            AggregationCache::Failed { error, at } if self.failure_policy.retains(*at) => {
                return Err(error.clone());
            }
            AggregationCache::Failed { .. } | AggregationCache::Unresolved => {}
        }

        let resolved = resolve_levels(&self.root, levels);
        if resolved.is_empty() {
            log::info!(
                "bem aggregation skipped root={} reason=no_levels",
                self.root.display()
            );
            return Ok(Arc::new(BlockGroups::new()));
        }

        let started = Instant::now();
        let level_count = resolved.len();
        match self.aggregate(resolved, cancel).await {
            Ok(groups) => {
                log::info!(
                    "bem aggregation root={} levels={} blocks={} files={} elapsed_ms={}",
                    self.root.display(),
                    level_count,
                    groups.len(),
                    groups.file_count(),
                    started.elapsed().as_millis()
                );
                let groups = Arc::new(groups);
                *cache = AggregationCache::Resolved(groups.clone());
                Ok(groups)
            }
            Err(ExplorerError::Cancelled) => {
                log::debug!("bem aggregation cancelled root={}", self.root.display());
                *cache = AggregationCache::Unresolved;
                Err(ExplorerError::Cancelled)
            }
            Err(error) => {
                log::warn!(
                    "bem aggregation failed root={} policy={:?}: {}",
                    self.root.display(),
                    self.failure_policy,
                    error
                );
                *cache = match self.failure_policy {
                    FailurePolicy::Never => AggregationCache::Unresolved,
                    _ => AggregationCache::Failed {
                        error: error.clone(),
                        at: Instant::now(),
                    },
                };
                Err(error)
            }
        }
    }

    /// Drops the cached result or failure. Waits for an in-flight walk first.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.lock().await;
        *cache = AggregationCache::Unresolved;
        log::debug!("bem aggregation invalidated root={}", self.root.display());
    }

    async fn aggregate(
        &self,
        levels: Vec<PathBuf>,
        cancel: &CancellationToken,
    ) -> Result<BlockGroups> {
        cancel.is_cancelled().ok_or(ExplorerError::Cancelled)?;
        let mut stream = self.walker.walk(levels, cancel.clone()).await?;

        let mut groups = BlockGroups::new();
        while let Some(item) = stream.recv().await {
            cancel.is_cancelled().ok_or(ExplorerError::Cancelled)?;
            let cell = item?;
            cell.validate()?;

            let level_path =
                pathdiff::diff_paths(&cell.layer, &self.root).unwrap_or_else(|| cell.layer.clone());
            let caption = self.captions.caption(&cell, &level_path.to_string_lossy());
            groups.push(FileRecord {
                name: caption,
                path: cell.path.clone(),
                cell,
            });
        }
        // A cancelled walker closes its stream early.
        cancel.is_cancelled().ok_or(ExplorerError::Cancelled)?;

        Ok(groups)
    }
}
