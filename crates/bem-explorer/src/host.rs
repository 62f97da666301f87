//! The UI host the explorer runs inside.

use std::sync::Arc;

use crate::error::Result;
use crate::node::BemNode;
use crate::provider::BemNodeProvider;

/// Handler invoked with the clicked node.
pub type CommandHandler = Arc<dyn Fn(&BemNode) -> Result<()> + Send + Sync>;

pub trait UiHost: Send + Sync {
    fn show_information_message(&self, message: &str);

    fn show_error_message(&self, message: &str);

    /// Opens a `file://` URI in the editor.
    fn open_file(&self, uri: &str) -> Result<()>;

    fn register_tree_provider(
        &self,
        provider_id: &str,
        provider: Arc<BemNodeProvider>,
    ) -> Result<()>;

    fn register_command(&self, command: &str, handler: CommandHandler) -> Result<()>;
}

pub type SharedHost = Arc<dyn UiHost>;
