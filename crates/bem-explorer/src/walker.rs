//! Entity walking.
//!
//! The aggregator only depends on [`EntityWalker`]: something that, given
//! resolved level directories, produces an unordered stream of [`Cell`]
//! records. [`FsWalker`] is the default filesystem implementation.

mod fswalk;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::cancel::CancellationToken;
use crate::error::WalkError;
use crate::types::Cell;

pub use fswalk::{FsWalker, LevelScheme};

/// Capacity of the channel between a walker and its consumer.
pub const CELL_CHANNEL_CAPACITY: usize = 256;

/// Stream of cells; the walk is finished when the channel closes.
/// An `Err` item fails the whole walk.
pub type CellStream = mpsc::Receiver<Result<Cell, WalkError>>;

#[async_trait]
pub trait EntityWalker: Send + Sync {
    /// Starts walking `levels`. Implementations should stop producing cells
    /// once `cancel` reports cancellation.
    async fn walk(
        &self,
        levels: Vec<PathBuf>,
        cancel: CancellationToken,
    ) -> Result<CellStream, WalkError>;
}

pub type SharedWalker = Arc<dyn EntityWalker>;
