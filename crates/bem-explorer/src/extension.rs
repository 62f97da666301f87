//! Activation: wires the provider and the open-file command into the host.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ExplorerConfig, ExplorerSettings};
use crate::error::{ExplorerError, Result};
use crate::host::{SharedHost, UiHost};
use crate::node::{BemNode, OPEN_FILE_COMMAND};
use crate::provider::BemNodeProvider;
use crate::walker::SharedWalker;

/// Identifier the tree provider is registered under.
pub const TREE_PROVIDER_ID: &str = "bemTree";

/// Activates the explorer with settings read from the workspace `.bemrc`.
///
/// An unreadable `.bemrc` is shown to the user and the defaults are used.
pub fn activate(
    host: SharedHost,
    workspace_root: Option<PathBuf>,
    walker: SharedWalker,
) -> Result<Arc<BemNodeProvider>> {
    let config = match &workspace_root {
        Some(root) => load_config(host.as_ref(), root),
        None => ExplorerConfig::default(),
    };
    activate_with_config(host, workspace_root, config, walker)
}

pub fn activate_with_config(
    host: SharedHost,
    workspace_root: Option<PathBuf>,
    config: ExplorerConfig,
    walker: SharedWalker,
) -> Result<Arc<BemNodeProvider>> {
    log::info!(
        "bem explorer activate root={} config={:?}",
        workspace_root
            .as_deref()
            .map(|root| root.display().to_string())
            .unwrap_or_else(|| "<none>".to_string()),
        config
    );

    let provider = Arc::new(BemNodeProvider::new(
        workspace_root,
        config,
        walker,
        host.clone(),
    ));
    host.register_tree_provider(TREE_PROVIDER_ID, provider.clone())?;

    // The host owns the handler, so the handler must not own the host.
    let command_host = Arc::downgrade(&host);
    host.register_command(
        OPEN_FILE_COMMAND,
        Arc::new(move |node: &BemNode| {
            let host = command_host
                .upgrade()
                .ok_or_else(|| ExplorerError::Host("host is gone".to_string()))?;
            open_file_in_editor(host.as_ref(), node)
        }),
    )?;

    Ok(provider)
}

/// Opens a leaf's file; other nodes are ignored.
pub fn open_file_in_editor(host: &dyn UiHost, node: &BemNode) -> Result<()> {
    match node {
        BemNode::Leaf { path, .. } => host.open_file(&file_uri(path)),
        BemNode::Root | BemNode::Node { .. } => Ok(()),
    }
}

pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn load_config(host: &dyn UiHost, root: &Path) -> ExplorerConfig {
    match ExplorerSettings::load(root).and_then(ExplorerSettings::into_config) {
        Ok(config) => config,
        Err(error) => {
            log::warn!("bem config ignored root={}: {}", root.display(), error);
            host.show_error_message(&error.to_string());
            ExplorerConfig::default()
        }
    }
}
