//! Favorite directories
//!
//! The store keeps an ordered, duplicate-free list of absolute paths and
//! rewrites the whole list through its backend on every change.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use toml_edit::{Array, DocumentMut, value};

use crate::errors::{AppError, AppResult};

/// Persistence for the favorites list. Always loads and saves the full list.
pub trait FavoritesBackend: Send + Sync {
    fn load(&self) -> AppResult<Vec<PathBuf>>;
    fn save(&self, paths: &[PathBuf]) -> AppResult<()>;
}

/// Favorites stored as `paths = [...]` in a TOML file.
///
/// Saving edits the existing document, so comments in the file survive.
#[derive(Debug, Clone)]
pub struct FavoritesFile {
    path: PathBuf,
}

impl FavoritesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FavoritesBackend for FavoritesFile {
    fn load(&self) -> AppResult<Vec<PathBuf>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Config(format!(
                    "cannot read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let doc: DocumentMut = content
            .parse()
            .map_err(|e| AppError::Config(format!("{}: {}", self.path.display(), e)))?;

        let Some(item) = doc.get("paths") else {
            return Ok(Vec::new());
        };
        let array = item.as_array().ok_or_else(|| {
            AppError::Config(format!("{}: 'paths' is not an array", self.path.display()))
        })?;

        Ok(array
            .iter()
            .filter_map(|v| v.as_str())
            .map(PathBuf::from)
            .collect())
    }

    fn save(&self, paths: &[PathBuf]) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| AppError::persist_failed(&self.path, e))?;
        }

        // Keep whatever else the user wrote in the file
        let mut doc = fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.parse::<DocumentMut>().ok())
            .unwrap_or_default();

        let mut array = Array::new();
        for path in paths {
            array.push(path.to_string_lossy().into_owned());
        }
        doc["paths"] = value(array);

        fs::write(&self.path, doc.to_string()).map_err(|e| AppError::persist_failed(&self.path, e))
    }
}

/// In-process backend, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: Mutex<Vec<PathBuf>>,
}

impl MemoryBackend {
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            saved: Mutex::new(paths),
        }
    }

    /// What the last save wrote
    pub fn saved(&self) -> Vec<PathBuf> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl FavoritesBackend for MemoryBackend {
    fn load(&self) -> AppResult<Vec<PathBuf>> {
        Ok(self.saved())
    }

    fn save(&self, paths: &[PathBuf]) -> AppResult<()> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = paths.to_vec();
        Ok(())
    }
}

/// Ordered set of paths: the Vec keeps display order, the set answers membership.
#[derive(Debug, Default, Clone)]
struct FavoritesList {
    order: Vec<PathBuf>,
    members: HashSet<PathBuf>,
}

impl FavoritesList {
    fn from_paths(paths: Vec<PathBuf>) -> Self {
        let mut list = Self::default();
        for path in paths {
            list.insert(path);
        }
        list
    }

    fn insert(&mut self, path: PathBuf) -> bool {
        if !self.members.insert(path.clone()) {
            return false;
        }
        self.order.push(path);
        true
    }

    fn remove(&mut self, path: &Path) -> bool {
        if !self.members.remove(path) {
            return false;
        }
        self.order.retain(|p| p != path);
        true
    }
}

/// Normalize to an absolute path so lookups agree with what was stored
fn normalize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Favorites with a persistent backend.
///
/// Methods take `&self`; the list sits behind a read-write lock so a display
/// layer can read while another thread mutates.
pub struct FavoritesStore {
    backend: Box<dyn FavoritesBackend>,
    list: RwLock<FavoritesList>,
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoritesStore")
            .field("favorites", &self.list())
            .finish()
    }
}

impl FavoritesStore {
    /// Open a store, loading the saved list.
    ///
    /// A missing or corrupt record loads as an empty list.
    pub fn open(backend: Box<dyn FavoritesBackend>) -> Self {
        let paths = backend.load().unwrap_or_else(|e| {
            log::warn!("could not load favorites: {}", e);
            Vec::new()
        });
        Self {
            backend,
            list: RwLock::new(FavoritesList::from_paths(paths)),
        }
    }

    /// Add a path. Ok(true) if newly added, Ok(false) if already present.
    ///
    /// If saving fails the list is left as it was.
    pub fn add(&self, path: &Path) -> AppResult<bool> {
        let path = normalize(path);
        let mut list = self.list.write().unwrap_or_else(PoisonError::into_inner);
        if !list.insert(path.clone()) {
            return Ok(false);
        }
        if let Err(e) = self.backend.save(&list.order) {
            list.remove(&path);
            return Err(e);
        }
        Ok(true)
    }

    /// Remove a path. Ok(true) if it was present.
    ///
    /// If saving fails the path is put back in its old position.
    pub fn remove(&self, path: &Path) -> AppResult<bool> {
        let path = normalize(path);
        let mut list = self.list.write().unwrap_or_else(PoisonError::into_inner);
        let previous = list.clone();
        if !list.remove(&path) {
            return Ok(false);
        }
        if let Err(e) = self.backend.save(&list.order) {
            *list = previous;
            return Err(e);
        }
        Ok(true)
    }

    /// Favorites in insertion order
    pub fn list(&self) -> Vec<PathBuf> {
        self.list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }

    pub fn contains(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .members
            .contains(&path)
    }

    pub fn len(&self) -> usize {
        self.list.read().unwrap_or_else(PoisonError::into_inner).order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
