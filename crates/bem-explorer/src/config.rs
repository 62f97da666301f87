//! Explorer configuration.
//!
//! [`ExplorerConfig`] holds every optional strategy the provider consults.
//! Each field is either unset (use the default) or a concrete function, and
//! the whole structure is resolved once when the provider is built.
//!
//! [`ExplorerSettings`] is the declarative subset that can be read from a
//! workspace `.bemrc` file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::caption::{CaptionFn, CaptionStrategy, EntityCaptionFn, LevelCaptionFn};
use crate::error::{ExplorerError, Result};
use crate::types::FileRecord;

pub const BEMRC_FILENAME: &str = ".bemrc";
/// Section of `.bemrc` `modules` read by the explorer.
pub const MODULE_NAME: &str = "vscode-bem-explorer";

/// Item handed to the entity filter: block names when listing the root,
/// file records when listing a block.
#[derive(Debug, Clone, Copy)]
pub enum EntityItem<'a> {
    Block(&'a str),
    File(&'a FileRecord),
}

/// Filter predicates may fail; a failure aborts the resolution that ran it.
pub type LevelFilter = Arc<dyn Fn(&str) -> std::result::Result<bool, String> + Send + Sync>;
pub type EntityFilter =
    Arc<dyn Fn(EntityItem<'_>) -> std::result::Result<bool, String> + Send + Sync>;

/// What the aggregator does with a failed walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep the failure until the cache is invalidated explicitly.
    #[default]
    Permanent,
    /// Keep the failure for the given duration, then walk again.
    RetryAfter(Duration),
    /// Never keep failures; the next request walks again.
    Never,
}

#[derive(Clone, Default)]
pub struct ExplorerConfig {
    pub levels: Option<Vec<String>>,
    pub filter_levels: Option<LevelFilter>,
    pub level_caption: Option<LevelCaptionFn>,
    pub entity_caption: Option<EntityCaptionFn>,
    pub caption: Option<CaptionFn>,
    pub filter_entities: Option<EntityFilter>,
    pub failure_policy: FailurePolicy,
}

impl std::fmt::Debug for ExplorerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerConfig")
            .field("levels", &self.levels)
            .field("filter_levels", &self.filter_levels.is_some())
            .field("level_caption", &self.level_caption.is_some())
            .field("entity_caption", &self.entity_caption.is_some())
            .field("caption", &self.caption.is_some())
            .field("filter_entities", &self.filter_entities.is_some())
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl ExplorerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.levels = Some(levels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_level_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<bool, String> + Send + Sync + 'static,
    {
        self.filter_levels = Some(Arc::new(filter));
        self
    }

    pub fn with_level_caption<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.level_caption = Some(Arc::new(hook));
        self
    }

    pub fn with_entity_caption<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::types::Cell) -> String + Send + Sync + 'static,
    {
        self.entity_caption = Some(Arc::new(hook));
        self
    }

    pub fn with_caption<F>(mut self, hook: F) -> Self
    where
        F: Fn(&crate::types::Cell, &str) -> String + Send + Sync + 'static,
    {
        self.caption = Some(Arc::new(hook));
        self
    }

    pub fn with_entity_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(EntityItem<'_>) -> std::result::Result<bool, String> + Send + Sync + 'static,
    {
        self.filter_entities = Some(Arc::new(filter));
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Configured levels with the level filter applied.
    pub fn levels(&self) -> Result<Vec<String>> {
        let levels = self.levels.clone().unwrap_or_default();
        let Some(filter) = &self.filter_levels else {
            return Ok(levels);
        };

        let mut kept = Vec::with_capacity(levels.len());
        for level in levels {
            let keep = filter(&level).map_err(|error| {
                ExplorerError::Configuration(format!("level filter failed for {level}: {error}"))
            })?;
            if keep {
                kept.push(level);
            }
        }
        Ok(kept)
    }

    pub fn caption_strategy(&self) -> CaptionStrategy {
        CaptionStrategy::new(
            self.level_caption.clone(),
            self.entity_caption.clone(),
            self.caption.clone(),
        )
    }

    /// Applies the entity filter to `items`, keeping everything when no filter
    /// is configured.
    pub fn filter_entities<T, F>(&self, items: Vec<T>, as_item: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> EntityItem<'_>,
    {
        let Some(filter) = &self.filter_entities else {
            return Ok(items);
        };

        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            let keep = filter(as_item(&item)).map_err(|error| {
                ExplorerError::Configuration(format!("entity filter failed: {error}"))
            })?;
            if keep {
                kept.push(item);
            }
        }
        Ok(kept)
    }
}

/// Declarative explorer settings from `.bemrc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExplorerSettings {
    pub levels: Vec<String>,
    /// Glob patterns of levels to skip.
    pub exclude_levels: Vec<String>,
    /// Glob patterns of blocks (and entity names) to hide.
    pub exclude_entities: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BemRc {
    /// Kept raw: only read when the module section has no levels, and
    /// shapes the explorer does not understand are skipped.
    levels: Option<Value>,
    modules: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RcLevel {
    Path(String),
    Described { path: String },
}

impl RcLevel {
    fn into_path(self) -> String {
        match self {
            Self::Path(path) | Self::Described { path } => path,
        }
    }
}

/// Level paths from a top-level `levels` value, in file order.
///
/// Accepts a list of paths or `{"path": ..}` objects, or an object keyed by
/// path. Anything else yields no levels.
fn rc_level_paths(levels: Value) -> Vec<String> {
    match levels {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<RcLevel>(item) {
                Ok(level) => Some(level.into_path()),
                Err(error) => {
                    log::debug!("bem config level skipped reason={error}");
                    None
                }
            })
            .collect(),
        Value::Object(levels) => levels.into_iter().map(|(path, _)| path).collect(),
        other => {
            log::debug!("bem config levels ignored value={other}");
            Vec::new()
        }
    }
}

impl ExplorerSettings {
    /// Reads `<root>/.bemrc`. A missing file yields default settings.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(BEMRC_FILENAME);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("bem config absent path={}", path.display());
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(ExplorerError::Configuration(format!(
                    "failed to read {}: {error}",
                    path.display()
                )))
            }
        };
        Self::parse(&raw).map_err(|error| {
            ExplorerError::Configuration(format!("{}: {error}", path.display()))
        })
    }

    /// Parses `.bemrc` contents: the explorer module section first, then the
    /// top-level `levels` as a fallback for the level list.
    pub fn parse(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        let mut rc: BemRc = serde_json::from_str(raw)?;
        let mut settings = match rc.modules.remove(MODULE_NAME) {
            Some(section) => serde_json::from_value(section)?,
            None => Self::default(),
        };
        if settings.levels.is_empty() {
            if let Some(levels) = rc.levels {
                settings.levels = rc_level_paths(levels);
            }
        }
        Ok(settings)
    }

    /// Turns the settings into a configuration with glob-based filters.
    pub fn into_config(self) -> Result<ExplorerConfig> {
        let mut config = ExplorerConfig::new();
        if !self.levels.is_empty() {
            config = config.with_levels(self.levels);
        }

        if !self.exclude_levels.is_empty() {
            let patterns = compile_patterns(&self.exclude_levels)?;
            config = config.with_level_filter(move |level| {
                Ok(!patterns.iter().any(|pattern| pattern.matches(level)))
            });
        }

        if !self.exclude_entities.is_empty() {
            let patterns = compile_patterns(&self.exclude_entities)?;
            config = config.with_entity_filter(move |item| {
                let excluded = match item {
                    EntityItem::Block(block) => {
                        patterns.iter().any(|pattern| pattern.matches(block))
                    }
                    EntityItem::File(record) => {
                        let entity = record.cell.entity.to_string();
                        patterns.iter().any(|pattern| pattern.matches(&entity))
                    }
                };
                Ok(!excluded)
            });
        }

        Ok(config)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).map_err(|error| {
                ExplorerError::Configuration(format!("invalid pattern {pattern}: {error}"))
            })
        })
        .collect()
}
