//! BEM entity explorer.
//!
//! Discovers blocks, elements and modifiers across layered BEM levels and
//! exposes them as a two-level tree (block → implementation file):
//! - Level resolution against the workspace root
//! - Pluggable entity walking (default filesystem walker included)
//! - Captioning with override hooks
//! - Walk-once aggregation cache shared by concurrent requests
//! - A tree provider and activation glue for a UI host

pub mod aggregator;
pub mod cancel;
pub mod caption;
pub mod config;
pub mod error;
pub mod extension;
pub mod host;
pub mod levels;
pub mod naming;
pub mod node;
pub mod provider;
pub mod types;
pub mod walker;

#[cfg(test)]
mod testing;

// Re-export main types
pub use aggregator::{CacheState, EntityAggregator};
pub use cancel::{CancellationToken, WalkVersionTracker};
pub use caption::CaptionStrategy;
pub use config::{EntityItem, ExplorerConfig, ExplorerSettings, FailurePolicy};
pub use error::{ExplorerError, Result, WalkError};
pub use extension::{activate, activate_with_config, TREE_PROVIDER_ID};
pub use host::{CommandHandler, UiHost};
pub use levels::resolve_levels;
pub use naming::{Entity, Modifier};
pub use node::{BemNode, OPEN_FILE_COMMAND};
pub use provider::BemNodeProvider;
pub use types::{BlockGroups, Cell, FileRecord};
pub use walker::{CellStream, EntityWalker, FsWalker, LevelScheme};
