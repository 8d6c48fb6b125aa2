use std::path::{Path, PathBuf};

use super::background::{BackgroundTask, FileOpResult, FileOperation};
use super::clipboard::Clipboard;
use super::navigation::{NavTree, NodeId};
use super::panel::{Panel, SortColumn};
use crate::async_io::manager::IoManager;
use crate::async_io::{IoRequest, IoResponse};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::favorites::{FavoritesFile, FavoritesStore, MemoryBackend};
use crate::utils::navigation_roots;

/// One browsing session: a panel, the navigation tree, favorites, the
/// clipboard and at most one running file operation.
#[derive(Debug)]
pub struct App {
    pub config: Config,
    panel: Panel,
    favorites: FavoritesStore,
    clipboard: Clipboard,
    nav: NavTree,
    io: IoManager,
    /// Currently running file operation (if any)
    background_task: Option<BackgroundTask>,
}

impl App {
    pub fn new(config: Config, favorites: FavoritesStore, start: PathBuf) -> Self {
        let panel = Panel::new(start, config.sorting.spec());
        let nav = NavTree::new(&navigation_roots(), &favorites.list());
        Self {
            config,
            panel,
            favorites,
            clipboard: Clipboard::default(),
            nav,
            io: IoManager::new(),
            background_task: None,
        }
    }

    /// Session with the on-disk configuration and favorites file
    pub fn open(start: PathBuf) -> Self {
        Self::with_config(Config::load(), start)
    }

    /// Session whose favorites live where `config` says
    pub fn with_config(config: Config, start: PathBuf) -> Self {
        let favorites = match config.favorites_path() {
            Some(path) => FavoritesStore::open(Box::new(FavoritesFile::new(path))),
            None => {
                log::warn!("no location for favorites; they will not be saved");
                FavoritesStore::open(Box::new(MemoryBackend::default()))
            }
        };
        Self::new(config, favorites, start)
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut Panel {
        &mut self.panel
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn nav(&self) -> &NavTree {
        &self.nav
    }

    pub fn is_busy(&self) -> bool {
        self.background_task.is_some()
    }

    /// Show a directory in the panel
    pub fn navigate(&mut self, path: &Path) -> AppResult<()> {
        self.panel.change_directory(path.to_path_buf())
    }

    /// Activate a tree node: list its subfolders and show it in the panel.
    /// Returns false for nodes without a path (the favorites group).
    pub fn open_node(&mut self, id: NodeId) -> AppResult<bool> {
        let Some(path) = self.nav.path_of(id).map(Path::to_path_buf) else {
            return Ok(false);
        };
        self.nav.expand(id)?;
        self.navigate(&path)?;
        Ok(true)
    }

    /// List a node's subfolders without changing the panel
    pub fn expand_node(&mut self, id: NodeId) -> AppResult<Vec<NodeId>> {
        self.nav.expand(id)
    }

    pub fn go_parent(&mut self) -> AppResult<bool> {
        self.panel.go_parent()
    }

    pub fn refresh(&mut self) -> AppResult<()> {
        self.panel.refresh()
    }

    /// Queue a re-list of the current directory on the I/O worker
    pub fn request_refresh(&self) {
        self.io.send(IoRequest::List(self.panel.path()));
    }

    /// Apply finished background listings. Listings for a directory the
    /// panel has since left are dropped. Returns true if the panel changed.
    pub fn poll_listing(&mut self) -> bool {
        let mut changed = false;
        while let Some(response) = self.io.try_recv() {
            match response {
                IoResponse::Listed(snapshot) => {
                    if self.panel.is_showing(snapshot.path()) {
                        self.panel.apply_snapshot(snapshot);
                        changed = true;
                    } else {
                        log::debug!("dropping stale listing of {}", snapshot.path().display());
                    }
                }
                IoResponse::Error(path, e) => {
                    if self.panel.is_showing(&path) {
                        self.panel.error = Some(e.to_string());
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    /// Sort by a column; choosing the current column flips the direction
    pub fn sort_by(&mut self, column: SortColumn) {
        self.panel.set_sort(column);
    }

    fn selected_path(&self) -> AppResult<PathBuf> {
        self.panel.selected_path().ok_or(AppError::NoSelection)
    }

    pub fn copy_selected(&mut self) -> AppResult<()> {
        let path = self.selected_path()?;
        self.clipboard.stage_copy(path);
        Ok(())
    }

    pub fn cut_selected(&mut self) -> AppResult<()> {
        let path = self.selected_path()?;
        self.clipboard.stage_cut(path);
        Ok(())
    }

    fn start(&mut self, operation: FileOperation) -> AppResult<()> {
        if self.is_busy() {
            return Err(AppError::Busy);
        }
        log::debug!("starting {}", operation.name());
        let opts = self.config.transfer.copy_options();
        self.background_task = Some(BackgroundTask::file_operation(operation, opts));
        Ok(())
    }

    /// Paste the staged entry into the directory on display.
    ///
    /// Runs in the background; completion is picked up by `poll_background`.
    pub fn paste(&mut self) -> AppResult<()> {
        if self.is_busy() {
            return Err(AppError::Busy);
        }
        let slot = self.clipboard.slot().cloned().ok_or(AppError::NothingStaged)?;
        let dest_dir = self.panel.path();
        self.start(FileOperation::Paste { slot, dest_dir })
    }

    /// Delete the selected entry. Nothing happens unless `confirmed`.
    pub fn delete_selected(&mut self, confirmed: bool) -> AppResult<()> {
        let path = self.selected_path()?;
        if !confirmed {
            return Err(AppError::NotConfirmed);
        }
        self.start(FileOperation::Delete { path })
    }

    /// Pick up a finished file operation, if any, and apply it
    pub fn poll_background(&mut self) -> Option<FileOpResult> {
        let task = self.background_task.as_mut()?;
        let Some(result) = task.try_recv() else {
            if task.is_finished() {
                log::warn!("file operation ended without reporting");
                self.background_task = None;
            }
            return None;
        };
        self.background_task = None;
        self.finish(&result);
        Some(result)
    }

    /// Block until the running file operation finishes, then apply it
    pub fn wait_background(&mut self) -> Option<FileOpResult> {
        let result = self.background_task.take()?.wait()?;
        self.finish(&result);
        Some(result)
    }

    fn finish(&mut self, result: &FileOpResult) {
        if let FileOperation::Paste { slot, .. } = &result.operation {
            self.clipboard.complete_paste(slot, result.outcome.is_ok());
        }

        // Re-list even after a failure: a partial copy may have left something behind
        if let Err(e) = self.panel.refresh() {
            log::warn!("refresh after {} failed: {}", result.operation.name(), e);
        }
        match &result.outcome {
            Ok(_) => log::info!("{} finished", result.operation.name()),
            Err(e) => self.panel.error = Some(e.to_string()),
        }
        if let Ok(Some(created)) = &result.outcome
            && created.parent().is_some_and(|dir| self.panel.is_showing(dir))
            && let Some(name) = created.file_name()
        {
            self.panel.select_name(&name.to_string_lossy());
        }
    }

    /// Add the selected directory to favorites, or remove it if present.
    /// With no directory selected the directory on display is used.
    ///
    /// Returns true if the path is a favorite afterwards.
    pub fn toggle_favorite_selected(&mut self) -> AppResult<bool> {
        let target = match self.panel.selected() {
            Some(entry) if entry.is_dir() => entry.path,
            _ => self.panel.path(),
        };
        let now_favorite = if self.favorites.contains(&target) {
            self.favorites.remove(&target)?;
            false
        } else {
            self.favorites.add(&target)?;
            true
        };
        self.nav.sync_favorites(&self.favorites.list());
        Ok(now_favorite)
    }

    /// The selected file, for handing to the platform opener
    pub fn open_target(&self) -> AppResult<PathBuf> {
        let entry = self.panel.selected().ok_or(AppError::NoSelection)?;
        if entry.is_dir() {
            return Err(AppError::IsDirectory(entry.path));
        }
        Ok(entry.path)
    }
}
