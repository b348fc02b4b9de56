use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::tree::{Node, TreeError};

/// In-memory adjacency view over the node set, built from one batch fetch
/// per request. Ancestor and descendant walks run against this snapshot so a
/// request never observes a half-mutated tree and never issues one store
/// round trip per level.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    by_id: HashMap<Uuid, Node>,
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl TreeSnapshot {
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();

        for node in nodes {
            if let Some(parent_id) = node.parent_id {
                children.entry(parent_id).or_default().push(node.id);
            }
            by_id.insert(node.id, node);
        }

        Self { by_id, children }
    }

    pub fn get(&self, id: Uuid) -> Option<&Node> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn root(&self) -> Option<&Node> {
        self.by_id.values().find(|n| n.parent_id.is_none())
    }

    /// Every stored node, including ones unreachable from the root.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.by_id.values()
    }

    pub fn children_of(&self, id: Uuid) -> Vec<&Node> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.by_id.get(c)).collect())
            .unwrap_or_default()
    }

    /// Ordered ancestor chain, root first, the node itself last.
    ///
    /// The walk is iterative with a visited set: a corrupted tree (cycle or a
    /// parent pointer to a missing node) yields `CorruptTree` instead of
    /// looping or panicking.
    pub fn ancestors(&self, id: Uuid) -> Result<Vec<&Node>, TreeError> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(id);

        while let Some(cursor) = current {
            if !visited.insert(cursor) {
                return Err(TreeError::CorruptTree(cursor));
            }
            let node = match self.by_id.get(&cursor) {
                Some(node) => node,
                // The start node missing is a plain not-found; a missing
                // *parent* means the stored tree is inconsistent.
                None if cursor == id => return Err(TreeError::NodeNotFound(id)),
                None => return Err(TreeError::CorruptTree(cursor)),
            };
            chain.push(node);
            current = node.parent_id;
        }

        chain.reverse();
        Ok(chain)
    }

    /// All nodes in the subtree below `id`, excluding `id` itself.
    /// Breadth-first over the child map with an explicit queue.
    pub fn descendants(&self, id: Uuid) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<Uuid> = VecDeque::new();
        queue.push_back(id);
        seen.insert(id);

        while let Some(cursor) = queue.pop_front() {
            if let Some(child_ids) = self.children.get(&cursor) {
                for &child in child_ids {
                    if seen.insert(child) {
                        if let Some(node) = self.by_id.get(&child) {
                            out.push(node);
                        }
                        queue.push_back(child);
                    }
                }
            }
        }

        out
    }

    /// True when `candidate` lies strictly below `id`.
    pub fn is_descendant_of(&self, candidate: Uuid, id: Uuid) -> bool {
        self.descendants(id).iter().any(|n| n.id == candidate)
    }
}
