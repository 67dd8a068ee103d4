//! Id → element lookup over a model tree.
//!
//! The index records, for every element id, the child-index path from the
//! root to that element.  Storing paths instead of references lets the same
//! index hand out both shared and mutable access to the tree it was built
//! from, without fighting the borrow checker over a tree of `&mut` pointers.
//!
//! The tree is walked in pre-order.  If two elements share an id, the one
//! visited last wins.

use std::collections::HashMap;

use super::model::SModelElement;

/// Maps element ids to their position in a model tree.
///
/// The index is a snapshot: adding or removing children after building it
/// invalidates the stored paths.  Rebuild it whenever the tree's shape
/// changes.
#[derive(Debug, Default, Clone)]
pub struct SModelIndex {
    paths: HashMap<String, Vec<usize>>,
}

impl SModelIndex {
    /// Builds an index over `root` and all of its descendants.
    pub fn new(root: &SModelElement) -> Self {
        let mut index = Self::default();
        let mut path = Vec::new();
        index.insert_subtree(root, &mut path);
        index
    }

    fn insert_subtree(&mut self, element: &SModelElement, path: &mut Vec<usize>) {
        self.paths.insert(element.id.clone(), path.clone());
        for (i, child) in element.children.iter().enumerate() {
            path.push(i);
            self.insert_subtree(child, path);
            path.pop();
        }
    }

    /// Number of distinct ids in the index.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Returns `true` if `id` was present when the index was built.
    pub fn contains(&self, id: &str) -> bool {
        self.paths.contains_key(id)
    }

    /// Looks up `id` in the tree the index was built from.
    pub fn get<'a>(&self, root: &'a SModelElement, id: &str) -> Option<&'a SModelElement> {
        let path = self.paths.get(id)?;
        path.iter()
            .try_fold(root, |element, &i| element.children.get(i))
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut<'a>(
        &self,
        root: &'a mut SModelElement,
        id: &str,
    ) -> Option<&'a mut SModelElement> {
        let path = self.paths.get(id)?;
        let mut element = root;
        for &i in path {
            element = element.children.get_mut(i)?;
        }
        Some(element)
    }
}
