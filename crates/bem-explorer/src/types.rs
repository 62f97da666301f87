//! Records flowing from the walker through the aggregator.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::WalkError;
use crate::naming::Entity;

/// One occurrence of a BEM entity at one level, in one technology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub entity: Entity,
    /// Technology, e.g. `css` or `bemhtml.js`.
    pub tech: String,
    /// Absolute path of the level this cell belongs to.
    pub layer: PathBuf,
    /// Absolute path of the implementation file.
    pub path: PathBuf,
}

impl Cell {
    /// Builds a cell, rejecting records the rest of the crate cannot group or
    /// caption.
    pub fn new(
        entity: Entity,
        tech: impl Into<String>,
        layer: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, WalkError> {
        let cell = Self {
            entity,
            tech: tech.into(),
            layer: layer.into(),
            path: path.into(),
        };
        cell.validate()?;
        Ok(cell)
    }

    pub fn validate(&self) -> Result<(), WalkError> {
        if self.entity.block.is_empty() {
            return Err(WalkError::InvalidCell(format!(
                "empty block name for {}",
                self.path.display()
            )));
        }
        if self.tech.is_empty() {
            return Err(WalkError::InvalidCell(format!(
                "empty tech for {}",
                self.path.display()
            )));
        }
        Ok(())
    }

    pub fn block(&self) -> &str {
        &self.entity.block
    }
}

/// A captioned file belonging to a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Display caption.
    pub name: String,
    pub path: PathBuf,
    pub cell: Cell,
}

/// Files grouped by owning block name.
///
/// Every record stored under a key has `cell.entity.block == key`; records keep
/// the order in which the walker emitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockGroups {
    groups: HashMap<String, Vec<FileRecord>>,
}

impl BlockGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the group of its block, creating the group if absent.
    pub fn push(&mut self, record: FileRecord) {
        self.groups
            .entry(record.cell.entity.block.clone())
            .or_default()
            .push(record);
    }

    pub fn get(&self, block: &str) -> Option<&[FileRecord]> {
        self.groups.get(block).map(Vec::as_slice)
    }

    /// Block names in lexicographic order.
    pub fn sorted_blocks(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.groups.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of file records across all blocks.
    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
