//! Test doubles shared by unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::cancel::CancellationToken;
use crate::error::{ExplorerError, Result, WalkError};
use crate::host::{CommandHandler, UiHost};
use crate::naming::Entity;
use crate::node::BemNode;
use crate::provider::BemNodeProvider;
use crate::types::Cell;
use crate::walker::{CellStream, EntityWalker};

/// Cell for `name` (origin naming) under `level/<block>/<name>.<tech>`.
pub fn cell(level: &Path, name: &str, tech: &str) -> Cell {
    let entity = Entity::parse(name).expect("valid entity name");
    let path = level
        .join(&entity.block)
        .join(format!("{name}.{tech}"));
    Cell {
        entity,
        tech: tech.to_string(),
        layer: level.to_path_buf(),
        path,
    }
}

/// Walker replaying a fixed list of cells, optionally ending in a failure.
#[derive(Debug, Default)]
pub struct FakeWalker {
    cells: Vec<Cell>,
    failure: Option<WalkError>,
    delay: Option<Duration>,
    walks: AtomicUsize,
    last_levels: Mutex<Vec<PathBuf>>,
}

impl FakeWalker {
    pub fn with_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    pub fn failing_after(cells: Vec<Cell>, failure: WalkError) -> Self {
        Self {
            cells,
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn walk_count(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }

    pub fn last_levels(&self) -> Vec<PathBuf> {
        self.last_levels.lock().clone()
    }
}

#[async_trait]
impl EntityWalker for FakeWalker {
    async fn walk(
        &self,
        levels: Vec<PathBuf>,
        _cancel: CancellationToken,
    ) -> std::result::Result<CellStream, WalkError> {
        self.walks.fetch_add(1, Ordering::SeqCst);
        *self.last_levels.lock() = levels;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let (tx, rx) = mpsc::channel(self.cells.len() + 1);
        for cell in &self.cells {
            tx.try_send(Ok(cell.clone())).expect("channel sized for all cells");
        }
        if let Some(failure) = &self.failure {
            tx.try_send(Err(failure.clone()))
                .expect("channel sized for all cells");
        }
        Ok(rx)
    }
}

/// Host recording every call made to it.
#[derive(Default)]
pub struct RecordingHost {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
    opened: Mutex<Vec<String>>,
    providers: Mutex<Vec<String>>,
    commands: Mutex<HashMap<String, CommandHandler>>,
}

impl RecordingHost {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    pub fn providers(&self) -> Vec<String> {
        self.providers.lock().clone()
    }

    pub fn run_command(&self, command: &str, node: &BemNode) -> Result<()> {
        let handler = self
            .commands
            .lock()
            .get(command)
            .cloned()
            .ok_or_else(|| ExplorerError::Host(format!("unknown command {command}")))?;
        handler(node)
    }
}

impl UiHost for RecordingHost {
    fn show_information_message(&self, message: &str) {
        self.infos.lock().push(message.to_string());
    }

    fn show_error_message(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn open_file(&self, uri: &str) -> Result<()> {
        self.opened.lock().push(uri.to_string());
        Ok(())
    }

    fn register_tree_provider(
        &self,
        provider_id: &str,
        _provider: Arc<BemNodeProvider>,
    ) -> Result<()> {
        self.providers.lock().push(provider_id.to_string());
        Ok(())
    }

    fn register_command(&self, command: &str, handler: CommandHandler) -> Result<()> {
        self.commands.lock().insert(command.to_string(), handler);
        Ok(())
    }
}
