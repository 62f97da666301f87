//! Human-readable captions for levels and entities.
//!
//! Three hooks can be overridden independently through
//! [`ExplorerConfig`](crate::config::ExplorerConfig): the level caption, the
//! entity caption, and the full caption composition. Defaults work with no
//! configuration at all.

use std::sync::Arc;

use crate::types::Cell;

/// Marker of a BEM blocks directory, stripped from level captions.
pub const BLOCKS_MARKER: &str = ".blocks";
/// Marker of vendored dependencies, stripped from level captions.
pub const VENDOR_MARKER: &str = "node_modules";

pub type LevelCaptionFn = Arc<dyn Fn(&str) -> String + Send + Sync>;
pub type EntityCaptionFn = Arc<dyn Fn(&Cell) -> String + Send + Sync>;
pub type CaptionFn = Arc<dyn Fn(&Cell, &str) -> String + Send + Sync>;

/// Caption hooks resolved once from configuration.
#[derive(Clone, Default)]
pub struct CaptionStrategy {
    level: Option<LevelCaptionFn>,
    entity: Option<EntityCaptionFn>,
    full: Option<CaptionFn>,
}

impl std::fmt::Debug for CaptionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionStrategy")
            .field("level", &self.level.is_some())
            .field("entity", &self.entity.is_some())
            .field("full", &self.full.is_some())
            .finish()
    }
}

impl CaptionStrategy {
    pub fn new(
        level: Option<LevelCaptionFn>,
        entity: Option<EntityCaptionFn>,
        full: Option<CaptionFn>,
    ) -> Self {
        Self {
            level,
            entity,
            full,
        }
    }

    pub fn level_caption(&self, level_relative_path: &str) -> String {
        match &self.level {
            Some(hook) => hook(level_relative_path),
            None => default_level_caption(level_relative_path),
        }
    }

    pub fn entity_caption(&self, cell: &Cell) -> String {
        match &self.entity {
            Some(hook) => hook(cell),
            None => default_entity_caption(cell),
        }
    }

    /// Caption of a file record: `entity@level.tech` unless overridden.
    pub fn caption(&self, cell: &Cell, level_relative_path: &str) -> String {
        if let Some(hook) = &self.full {
            return hook(cell, level_relative_path);
        }
        format!(
            "{}@{}.{}",
            self.entity_caption(cell),
            self.level_caption(level_relative_path),
            cell.tech
        )
    }
}

/// Removes the first blocks marker, then the first vendor marker.
pub fn default_level_caption(level_relative_path: &str) -> String {
    level_relative_path
        .replacen(BLOCKS_MARKER, "", 1)
        .replacen(VENDOR_MARKER, "", 1)
}

/// Entity name with the first occurrence of its block name removed.
pub fn default_entity_caption(cell: &Cell) -> String {
    cell.entity.to_string().replacen(&cell.entity.block, "", 1)
}
