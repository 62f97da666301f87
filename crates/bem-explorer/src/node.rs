//! Tree nodes handed to the host.
//!
//! The tree is exactly two levels deep: an invisible root, one node per
//! block, and one leaf per implementation file.

use std::fmt;
use std::path::{Path, PathBuf};

/// Command the host runs when a leaf is clicked.
pub const OPEN_FILE_COMMAND: &str = "extension.openFileInEditor";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BemNode {
    /// Invisible root; its children are the blocks.
    Root,
    /// A block.
    Node { name: String },
    /// A file of a block.
    Leaf { name: String, path: PathBuf },
}

impl BemNode {
    pub fn node(name: impl Into<String>) -> Self {
        Self::Node { name: name.into() }
    }

    pub fn leaf(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Leaf {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Display label. The root is never shown, so its label is empty.
    pub fn label(&self) -> &str {
        match self {
            Self::Root => "",
            Self::Node { name } | Self::Leaf { name, .. } => name,
        }
    }

    /// Leaves are the only unexpandable nodes.
    pub fn has_children(&self) -> bool {
        match self {
            Self::Root | Self::Node { .. } => true,
            Self::Leaf { .. } => false,
        }
    }

    pub fn click_command(&self) -> Option<&'static str> {
        match self {
            Self::Leaf { .. } => Some(OPEN_FILE_COMMAND),
            Self::Root | Self::Node { .. } => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Leaf { path, .. } => Some(path),
            Self::Root | Self::Node { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Node { .. } => "node",
            Self::Leaf { .. } => "leaf",
        }
    }
}

impl fmt::Display for BemNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf { path, .. } => {
                write!(f, "{} {} ({})", self.kind(), self.label(), path.display())
            }
            _ => write!(f, "{} {}", self.kind(), self.label()),
        }
    }
}
