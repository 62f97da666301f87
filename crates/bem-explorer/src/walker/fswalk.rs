//! Filesystem walker for nested and flat BEM levels.
//!
//! Nested levels keep every block in its own directory:
//!
//! ```text
//! common.blocks/
//!   button/
//!     button.css
//!     __text/button__text.css
//!     _size/button_size_l.css
//!     __text/_theme/button__text_theme_dark.css
//! ```
//!
//! Flat levels keep every file directly in the level directory. A file is
//! emitted only when its parsed entity agrees with the directory it lives in.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;
use tokio::sync::mpsc;

use super::{CellStream, EntityWalker, CELL_CHANNEL_CAPACITY};
use crate::cancel::CancellationToken;
use crate::error::WalkError;
use crate::naming::{Entity, ELEM_DELIM, MOD_DELIM};
use crate::types::Cell;

/// Directory layout of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelScheme {
    #[default]
    Nested,
    Flat,
}

impl LevelScheme {
    fn max_depth(self) -> usize {
        match self {
            Self::Nested => 4,
            Self::Flat => 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FsWalker {
    schemes: HashMap<PathBuf, LevelScheme>,
    default_scheme: LevelScheme,
}

impl FsWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scheme used for levels without an explicit one.
    pub fn with_default_scheme(mut self, scheme: LevelScheme) -> Self {
        self.default_scheme = scheme;
        self
    }

    /// Sets the scheme for one absolute level path.
    pub fn with_scheme(mut self, level: impl Into<PathBuf>, scheme: LevelScheme) -> Self {
        self.schemes.insert(level.into(), scheme);
        self
    }

    fn scheme_for(&self, level: &Path) -> LevelScheme {
        self.schemes
            .get(level)
            .copied()
            .unwrap_or(self.default_scheme)
    }
}

#[async_trait]
impl EntityWalker for FsWalker {
    async fn walk(
        &self,
        levels: Vec<PathBuf>,
        cancel: CancellationToken,
    ) -> Result<CellStream, WalkError> {
        let plan: Vec<(PathBuf, LevelScheme)> = levels
            .into_iter()
            .map(|level| {
                let scheme = self.scheme_for(&level);
                (level, scheme)
            })
            .collect();

        Ok(spawn_walk(move |tx| {
            for (level, scheme) in &plan {
                if walk_level(level, *scheme, &cancel, &tx).is_none() {
                    break;
                }
            }
        }))
    }
}

/// Runs `work` on the blocking pool and returns the receiving end of its
/// channel. If `work` panics, the stream ends with a `WalkError::Walker`
/// instead of closing as if the walk had completed.
fn spawn_walk<F>(work: F) -> CellStream
where
    F: FnOnce(mpsc::Sender<Result<Cell, WalkError>>) + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CELL_CHANNEL_CAPACITY);
    let failure_tx = tx.clone();
    let handle = tokio::task::spawn_blocking(move || work(tx));

    tokio::spawn(async move {
        if let Err(error) = handle.await {
            log::warn!("bem walk task failed error={}", error);
            let _ = failure_tx
                .send(Err(WalkError::Walker(format!("walk task failed: {error}"))))
                .await;
        }
    });

    rx
}

/// Walks one level, sending cells as they are found.
///
/// Returns `None` when the walk must stop: cancelled, the consumer went away,
/// or an error was sent.
fn walk_level(
    level: &Path,
    scheme: LevelScheme,
    cancel: &CancellationToken,
    tx: &mpsc::Sender<Result<Cell, WalkError>>,
) -> Option<()> {
    let walker = WalkBuilder::new(level)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(Some(scheme.max_depth()))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut emitted = 0usize;
    for entry in walker {
        cancel.is_cancelled()?;

        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                let _ = tx.blocking_send(Err(WalkError::io(level, error)));
                return None;
            }
        };
        if !entry.file_type().is_some_and(|kind| kind.is_file()) {
            continue;
        }

        let Some(cell) = classify(level, scheme, entry.path()) else {
            continue;
        };
        tx.blocking_send(Ok(cell)).ok()?;
        emitted += 1;
    }

    log::debug!(
        "bem level walked level={} scheme={:?} cells={}",
        level.display(),
        scheme,
        emitted
    );
    Some(())
}

/// Turns a file under `level` into a cell, or `None` if it is not an entity
/// file at the right place.
fn classify(level: &Path, scheme: LevelScheme, path: &Path) -> Option<Cell> {
    let relative = path.strip_prefix(level).ok()?;
    let mut parts: Vec<&str> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<_>>()?;
    let file_name = parts.pop()?;

    let (stem, tech) = file_name.split_once('.')?;
    let entity = Entity::parse(stem)?;

    let placed = match scheme {
        LevelScheme::Flat => parts.is_empty(),
        LevelScheme::Nested => nested_location_matches(&parts, &entity),
    };
    if !placed {
        return None;
    }

    match Cell::new(entity, tech, level, path) {
        Ok(cell) => Some(cell),
        Err(error) => {
            log::debug!("bem file skipped path={} reason={}", path.display(), error);
            None
        }
    }
}

/// Checks `block[/__elem][/_mod]` directories against the parsed entity.
fn nested_location_matches(dirs: &[&str], entity: &Entity) -> bool {
    let Some((block, rest)) = dirs.split_first() else {
        return false;
    };
    if *block != entity.block {
        return false;
    }

    let mut elem_dir = None;
    let mut mod_dir = None;
    for dir in rest {
        if let Some(elem) = dir.strip_prefix(ELEM_DELIM) {
            if elem_dir.is_some() || mod_dir.is_some() {
                return false;
            }
            elem_dir = Some(elem);
        } else if let Some(name) = dir.strip_prefix(MOD_DELIM) {
            if mod_dir.is_some() {
                return false;
            }
            mod_dir = Some(name);
        } else {
            return false;
        }
    }

    let elem_ok = entity.elem.as_deref() == elem_dir;
    let mod_ok = match (&entity.modifier, mod_dir) {
        (Some(modifier), Some(dir)) => modifier.name == dir,
        (None, None) => true,
        _ => false,
    };
    elem_ok && mod_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    async fn collect(walker: &FsWalker, levels: Vec<PathBuf>) -> Vec<Cell> {
        let mut stream = walker
            .walk(levels, CancellationToken::noop())
            .await
            .unwrap();
        let mut cells = Vec::new();
        while let Some(item) = stream.recv().await {
            cells.push(item.unwrap());
        }
        cells
    }

    #[tokio::test]
    async fn walks_nested_level() {
        let dir = tempfile::tempdir().unwrap();
        let level = dir.path().join("common.blocks");
        touch(&level, "button/button.css");
        touch(&level, "button/button.bemhtml.js");
        touch(&level, "button/__text/button__text.css");
        touch(&level, "button/_size/button_size_l.css");
        touch(&level, "button/__text/_theme/button__text_theme_dark.css");
        touch(&level, "button/README.md");
        touch(&level, "button/_size/input_size_l.css");
        touch(&level, "button/link.css");

        let cells = collect(&FsWalker::new(), vec![level.clone()]).await;
        let names: Vec<String> = cells
            .iter()
            .map(|cell| format!("{}.{}", cell.entity, cell.tech))
            .collect();

        assert_eq!(
            names,
            vec![
                "button__text_theme_dark.css",
                "button__text.css",
                "button_size_l.css",
                "button.bemhtml.js",
                "button.css",
            ]
        );
        assert!(cells.iter().all(|cell| cell.layer == level));
    }

    #[tokio::test]
    async fn walks_flat_level() {
        let dir = tempfile::tempdir().unwrap();
        let level = dir.path().join("flat.blocks");
        touch(&level, "button.css");
        touch(&level, "button__text.js");
        touch(&level, "nested/button.css");

        let walker = FsWalker::new().with_scheme(level.clone(), LevelScheme::Flat);
        let cells = collect(&walker, vec![level]).await;
        let names: Vec<String> = cells.iter().map(|cell| cell.entity.to_string()).collect();
        assert_eq!(names, vec!["button", "button__text"]);
    }

    #[tokio::test]
    async fn missing_level_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut stream = FsWalker::new()
            .walk(vec![dir.path().join("gone")], CancellationToken::noop())
            .await
            .unwrap();
        let first = stream.recv().await.unwrap();
        assert!(matches!(first, Err(WalkError::Io { .. })));
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancelled_walk_emits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let level = dir.path().join("common.blocks");
        touch(&level, "button/button.css");

        let tracker = crate::cancel::WalkVersionTracker::new();
        let token = tracker.token();
        tracker.cancel_all();

        let mut stream = FsWalker::new().walk(vec![level], token).await.unwrap();
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn panicking_walk_ends_with_walker_error() {
        let level = PathBuf::from("/ws/common.blocks");
        let sent = Cell::new(
            Entity::block("button"),
            "css",
            &level,
            level.join("button/button.css"),
        )
        .unwrap();

        let mut stream = spawn_walk(move |tx| {
            tx.blocking_send(Ok(sent)).unwrap();
            panic!("walker blew up");
        });

        let first = stream.recv().await.unwrap().unwrap();
        assert_eq!(first.entity.block, "button");
        let second = stream.recv().await.unwrap();
        assert!(matches!(
            second,
            Err(WalkError::Walker(message)) if message.contains("walk task failed")
        ));
        assert!(stream.recv().await.is_none());
    }

    #[test]
    fn nested_location_rules() {
        let block = Entity::block("b");
        let elem = Entity::block("b").with_elem("e");
        let elem_mod = Entity::block("b").with_elem("e").with_mod("m", Some("v"));

        assert!(nested_location_matches(&["b"], &block));
        assert!(!nested_location_matches(&[], &block));
        assert!(!nested_location_matches(&["c"], &block));
        assert!(nested_location_matches(&["b", "__e"], &elem));
        assert!(!nested_location_matches(&["b"], &elem));
        assert!(nested_location_matches(&["b", "__e", "_m"], &elem_mod));
        assert!(!nested_location_matches(&["b", "_m", "__e"], &elem_mod));
        assert!(!nested_location_matches(&["b", "__e", "_x"], &elem_mod));
    }
}
