//! Navigation tree model
//!
//! Every node records its absolute path when it is created. Paths are never
//! rebuilt from display labels.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::AppResult;
use crate::fs::ops::child_directories;

/// Folders the tree never shows
const HIDDEN_FOLDERS: &[&str] = &["$RECYCLE.BIN", "System Volume Information"];

/// Opaque node identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(u64);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeKind {
    /// Group node holding the favorites; has no path of its own
    FavoritesGroup,
    Favorite,
    /// Drive or filesystem root
    Root,
    Folder,
}

#[derive(Clone, Debug)]
pub struct NavNode {
    pub label: String,
    pub kind: NodeKind,
    pub path: Option<PathBuf>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Children have been listed at least once
    pub expanded: bool,
}

/// Display label for a path: its last component, or the whole path for roots
fn label_for(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[derive(Debug)]
pub struct NavTree {
    nodes: HashMap<NodeId, NavNode>,
    top_level: Vec<NodeId>,
    favorites_group: NodeId,
    next_id: u64,
}

impl NavTree {
    /// Build the tree: a favorites group first, then one node per root
    pub fn new(roots: &[PathBuf], favorites: &[PathBuf]) -> Self {
        let mut tree = Self {
            nodes: HashMap::new(),
            top_level: Vec::new(),
            favorites_group: NodeId(0),
            next_id: 0,
        };

        let group = tree.insert(NavNode {
            label: "收藏夹".to_string(),
            kind: NodeKind::FavoritesGroup,
            path: None,
            parent: None,
            children: Vec::new(),
            expanded: true,
        });
        tree.favorites_group = group;
        tree.top_level.push(group);
        tree.sync_favorites(favorites);

        for root in roots {
            let id = tree.insert(NavNode {
                label: root.to_string_lossy().into_owned(),
                kind: NodeKind::Root,
                path: Some(root.clone()),
                parent: None,
                children: Vec::new(),
                expanded: false,
            });
            tree.top_level.push(id);
        }

        tree
    }

    fn insert(&mut self, node: NavNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Drop a node and its whole subtree from the index
    fn forget(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.forget(child);
            }
        }
    }

    fn replace_children(&mut self, id: NodeId, children: Vec<(String, NodeKind, PathBuf)>) {
        let old = match self.nodes.get_mut(&id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in old {
            self.forget(child);
        }

        let mut ids = Vec::with_capacity(children.len());
        for (label, kind, path) in children {
            ids.push(self.insert(NavNode {
                label,
                kind,
                path: Some(path),
                parent: Some(id),
                children: Vec::new(),
                expanded: false,
            }));
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = ids;
            node.expanded = true;
        }
    }

    /// Rebuild the favorites group from the store's list
    pub fn sync_favorites(&mut self, favorites: &[PathBuf]) {
        let children = favorites
            .iter()
            .map(|p| (label_for(p), NodeKind::Favorite, p.clone()))
            .collect();
        self.replace_children(self.favorites_group, children);
    }

    /// List the readable subdirectories of a node and make them its children.
    ///
    /// Returns the new child ids. The favorites group has nothing to expand.
    pub fn expand(&mut self, id: NodeId) -> AppResult<Vec<NodeId>> {
        let Some(path) = self.path_of(id).map(Path::to_path_buf) else {
            return Ok(self.children(id).to_vec());
        };

        let children = child_directories(&path)?
            .into_iter()
            .filter(|e| !HIDDEN_FOLDERS.contains(&e.name.as_str()))
            .map(|e| (e.name, NodeKind::Folder, e.path))
            .collect();
        self.replace_children(id, children);
        Ok(self.children(id).to_vec())
    }

    /// Absolute path a node stands for. None for the favorites group.
    pub fn path_of(&self, id: NodeId) -> Option<&Path> {
        self.nodes.get(&id)?.path.as_deref()
    }

    pub fn node(&self, id: NodeId) -> Option<&NavNode> {
        self.nodes.get(&id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn top_level(&self) -> &[NodeId] {
        &self.top_level
    }

    pub fn favorites_group(&self) -> NodeId {
        self.favorites_group
    }

    /// Child of `parent` standing for `path`, if listed
    pub fn find_child(&self, parent: NodeId, path: &Path) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.path_of(c) == Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let tmp = TempDir::new().unwrap();
        let favs = vec![tmp.path().join("fav")];
        let tree = NavTree::new(&[tmp.path().to_path_buf()], &favs);

        let top = tree.top_level();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], tree.favorites_group());
        assert_eq!(tree.path_of(top[0]), None);
        assert_eq!(tree.path_of(top[1]), Some(tmp.path()));

        let fav_nodes = tree.children(tree.favorites_group());
        assert_eq!(fav_nodes.len(), 1);
        let fav = tree.node(fav_nodes[0]).unwrap();
        assert_eq!(fav.label, "fav");
        assert_eq!(fav.kind, NodeKind::Favorite);
    }

    #[test]
    fn test_expand_uses_real_paths() {
        let tmp = TempDir::new().unwrap();
        // Labels that would confuse splitting on spaces
        fs::create_dir(tmp.path().join("My Documents")).unwrap();
        fs::create_dir(tmp.path().join("$RECYCLE.BIN")).unwrap();
        fs::write(tmp.path().join("file.txt"), b"x").unwrap();

        let mut tree = NavTree::new(&[tmp.path().to_path_buf()], &[]);
        let root = tree.top_level()[1];
        let children = tree.expand(root).unwrap();

        assert_eq!(children.len(), 1);
        let node = tree.node(children[0]).unwrap();
        assert_eq!(node.label, "My Documents");
        assert_eq!(node.parent, Some(root));
        assert_eq!(tree.path_of(children[0]), Some(tmp.path().join("My Documents").as_path()));
    }

    #[test]
    fn test_reexpand_replaces_children() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/deep")).unwrap();

        let mut tree = NavTree::new(&[tmp.path().to_path_buf()], &[]);
        let root = tree.top_level()[1];
        let first = tree.expand(root).unwrap();
        tree.expand(first[0]).unwrap();

        fs::create_dir(tmp.path().join("b")).unwrap();
        let second = tree.expand(root).unwrap();

        assert_eq!(second.len(), 2);
        // Old subtree is gone from the index
        assert!(tree.node(first[0]).is_none());
        assert!(tree.find_child(root, &tmp.path().join("b")).is_some());
    }

    #[test]
    fn test_sync_favorites() {
        let mut tree = NavTree::new(&[], &[PathBuf::from("/x")]);
        tree.sync_favorites(&[PathBuf::from("/y"), PathBuf::from("/z")]);
        let paths: Vec<&Path> = tree
            .children(tree.favorites_group())
            .iter()
            .filter_map(|&id| tree.path_of(id))
            .collect();
        assert_eq!(paths, vec![Path::new("/y"), Path::new("/z")]);
    }

    #[test]
    fn test_expand_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let mut tree = NavTree::new(&[tmp.path().join("gone")], &[]);
        let root = tree.top_level()[1];
        assert!(tree.expand(root).is_err());
    }
}
