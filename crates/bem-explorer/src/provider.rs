//! Tree provider: the node-resolution protocol the host drives.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::aggregator::EntityAggregator;
use crate::cancel::WalkVersionTracker;
use crate::config::{EntityItem, ExplorerConfig};
use crate::error::{ExplorerError, Result};
use crate::host::SharedHost;
use crate::node::BemNode;
use crate::types::{BlockGroups, FileRecord};
use crate::walker::SharedWalker;

pub const NO_WORKSPACE_MESSAGE: &str = "No BEM file structure in empty workspace";

pub struct BemNodeProvider {
    config: ExplorerConfig,
    /// `None` when no workspace is open.
    aggregator: Option<EntityAggregator>,
    host: SharedHost,
    notice_shown: AtomicBool,
    walks: WalkVersionTracker,
}

impl std::fmt::Debug for BemNodeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BemNodeProvider")
            .field("config", &self.config)
            .field("aggregator", &self.aggregator)
            .field("notice_shown", &self.notice_shown)
            .finish()
    }
}

impl BemNodeProvider {
    pub fn new(
        workspace_root: Option<PathBuf>,
        config: ExplorerConfig,
        walker: SharedWalker,
        host: SharedHost,
    ) -> Self {
        let aggregator = workspace_root.map(|root| {
            EntityAggregator::new(
                root,
                walker,
                config.caption_strategy(),
                config.failure_policy,
            )
        });
        Self {
            config,
            aggregator,
            host,
            notice_shown: AtomicBool::new(false),
            walks: WalkVersionTracker::new(),
        }
    }

    pub fn workspace_root(&self) -> Option<&Path> {
        self.aggregator.as_ref().map(EntityAggregator::root)
    }

    pub fn aggregator(&self) -> Option<&EntityAggregator> {
        self.aggregator.as_ref()
    }

    pub fn provide_root_node(&self) -> BemNode {
        BemNode::Root
    }

    pub fn get_label<'a>(&self, node: &'a BemNode) -> &'a str {
        node.label()
    }

    pub fn get_has_children(&self, node: &BemNode) -> bool {
        node.has_children()
    }

    pub fn get_click_command(&self, node: &BemNode) -> Option<&'static str> {
        node.click_command()
    }

    /// Children of `node`: blocks for the root, files for a block, nothing for
    /// a leaf.
    ///
    /// Without a workspace every node resolves to nothing and the user is told
    /// once. Configuration errors are also shown to the user before being
    /// returned.
    pub async fn resolve_children(&self, node: &BemNode) -> Result<Vec<BemNode>> {
        let Some(aggregator) = &self.aggregator else {
            if !self.notice_shown.swap(true, Ordering::SeqCst) {
                self.host.show_information_message(NO_WORKSPACE_MESSAGE);
            }
            return Ok(Vec::new());
        };

        let result = self.resolve_with(aggregator, node).await;
        if let Err(error) = &result {
            self.report(node, error);
        }
        result
    }

    /// Cancels every walk started so far.
    pub fn cancel_pending(&self) {
        let version = self.walks.cancel_all();
        log::debug!("bem walks cancelled version={version}");
    }

    /// Forgets the cached entities so the next expansion walks again.
    pub async fn refresh(&self) {
        if let Some(aggregator) = &self.aggregator {
            aggregator.invalidate().await;
        }
    }

    async fn resolve_with(
        &self,
        aggregator: &EntityAggregator,
        node: &BemNode,
    ) -> Result<Vec<BemNode>> {
        match node {
            BemNode::Root => {
                let blocks = self.entities(aggregator).await?;
                let names = self
                    .config
                    .filter_entities(blocks.sorted_blocks(), |name| EntityItem::Block(name))?;
                Ok(names.into_iter().map(BemNode::node).collect())
            }
            BemNode::Node { name } => {
                let blocks = self.entities(aggregator).await?;
                let records: Vec<&FileRecord> = blocks
                    .get(name)
                    .map(|records| records.iter().collect())
                    .unwrap_or_default();
                let records = self
                    .config
                    .filter_entities(records, |record| EntityItem::File(record))?;
                Ok(records
                    .into_iter()
                    .map(|record| BemNode::leaf(record.name.clone(), record.path.clone()))
                    .collect())
            }
            BemNode::Leaf { .. } => Ok(Vec::new()),
        }
    }

    async fn entities(&self, aggregator: &EntityAggregator) -> Result<Arc<BlockGroups>> {
        let levels = self.config.levels()?;
        aggregator.get_entities(&levels, &self.walks.token()).await
    }

    fn report(&self, node: &BemNode, error: &ExplorerError) {
        match error {
            ExplorerError::Cancelled => {
                log::debug!("bem resolve cancelled node={node}");
            }
            ExplorerError::Configuration(_) => {
                log::warn!("bem resolve failed node={node}: {error}");
                self.host.show_error_message(&error.to_string());
            }
            _ => {
                log::warn!("bem resolve failed node={node}: {error}");
            }
        }
    }
}
