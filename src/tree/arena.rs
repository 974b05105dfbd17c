//! Arena-backed condition tree
//!
//! Nodes live in a map keyed by `NodeId`. Parent links are ids, not
//! pointers, and every structural operation validates its arguments before
//! touching the arena so a failed call leaves the tree unchanged.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::condition::{Condition, DataTypeExpression};
use crate::error::{FilterError, Result};
use crate::property::PropertyDescriptor;

use super::node::{Combinator, ConditionGroup, Node, NodeId, NodeKind, PropertyCondition};
use super::notify::{ListenerId, Notifier, TreeUpdate};

/// Recursive condition structure for instances of `T`
pub struct ConditionTree<T> {
    nodes: AHashMap<NodeId, Node<T>>,
    roots: SmallVec<[NodeId; 4]>,
    next_id: u32,
    notifier: Arc<Mutex<Notifier>>,
}

impl<T> ConditionTree<T> {
    /// Empty tree
    pub fn new() -> Self {
        Self {
            nodes: AHashMap::new(),
            roots: SmallVec::new(),
            next_id: 0,
            notifier: Arc::default(),
        }
    }

    /// Tree holding a single root group
    pub fn with_root_group(combinator: Combinator) -> Self {
        let mut tree = Self::new();
        let id = tree.allocate_id();
        tree.nodes.insert(
            id,
            Node::new(id, None, NodeKind::Group(ConditionGroup::new(combinator))),
        );
        tree.roots.push(id);
        tree
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(&id)
    }

    /// Like `get`, failing with `NodeNotFound`
    pub fn node(&self, id: NodeId) -> Result<&Node<T>> {
        self.nodes.get(&id).ok_or(FilterError::NodeNotFound(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children of `id`; empty for leaves and unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children()).unwrap_or(&[])
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.parent.is_none())
    }

    /// Distance from the root list: 0 for roots
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut node = self.nodes.get(&id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            depth += 1;
        }
        Some(depth)
    }

    pub fn group(&self, id: NodeId) -> Result<&ConditionGroup> {
        self.node(id)?.as_group().ok_or(FilterError::NotAGroup(id))
    }

    pub fn condition(&self, id: NodeId) -> Result<&PropertyCondition<T>> {
        self.node(id)?
            .as_condition()
            .ok_or(FilterError::NotACondition(id))
    }

    /// Groups are always valid; leaves must be resolved with a usable expression
    pub fn is_valid(&self, id: NodeId) -> bool {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Group(_)) => true,
            Some(NodeKind::Condition(c)) => c.is_valid(),
            None => false,
        }
    }

    /// `id` and all its descendants, depth-first pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.contains(id) {
            self.collect_preorder(id, &mut out);
        }
        out
    }

    /// Every node, depth-first pre-order over the roots
    pub fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.collect_preorder(root, &mut out);
        }
        out
    }

    fn collect_preorder(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for &child in self.children(id) {
            self.collect_preorder(child, out);
        }
    }

    /// Ids of all leaf conditions, in tree order
    pub fn conditions(&self) -> Vec<NodeId> {
        self.walk()
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| !n.is_group()))
            .collect()
    }

    /// `start` followed by its ancestors up to the root
    pub(crate) fn path_to_root(&self, start: Option<NodeId>) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = start;
        while let Some(id) = current {
            path.push(id);
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        path
    }

    // ========================================================================
    // Structural mutation
    // ========================================================================

    /// Add a group under `parent`, or as a new root when `parent` is `None`
    pub fn add_group(&mut self, parent: Option<NodeId>, combinator: Combinator) -> Result<NodeId> {
        self.insert(parent, NodeKind::Group(ConditionGroup::new(combinator)))
    }

    /// Add a leaf condition under `parent`, or as a new root when `parent` is `None`
    pub fn add_condition(
        &mut self,
        parent: Option<NodeId>,
        condition: PropertyCondition<T>,
    ) -> Result<NodeId> {
        self.insert(parent, NodeKind::Condition(condition))
    }

    fn insert(&mut self, parent: Option<NodeId>, kind: NodeKind<T>) -> Result<NodeId> {
        if let Some(parent) = parent {
            // Only groups take children
            self.group(parent)?;
        }

        let id = self.allocate_id();
        self.nodes.insert(id, Node::new(id, parent, kind));
        match parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(&parent) {
                    p.children.push(id);
                }
            }
            None => self.roots.push(id),
        }

        debug_assert!(self.links_consistent());
        self.raise(Some(id));
        Ok(id)
    }

    /// Remove `id` together with its subtree
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let parent = self.node(id)?.parent;

        match parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(&parent) {
                    p.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        for removed in self.descendants(id) {
            self.nodes.remove(&removed);
        }

        debug_assert!(self.links_consistent());
        self.raise(parent);
        Ok(())
    }

    pub fn set_combinator(&mut self, id: NodeId, combinator: Combinator) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(FilterError::NodeNotFound(id))?;
        let NodeKind::Group(group) = &mut node.kind else {
            return Err(FilterError::NotAGroup(id));
        };
        if group.combinator == combinator {
            return Ok(());
        }
        group.combinator = combinator;
        self.raise(Some(id));
        Ok(())
    }

    /// Select another operator on a leaf
    ///
    /// Any operator is accepted here; kind/operator mismatches surface when
    /// the tree is compiled.
    pub fn set_condition(&mut self, id: NodeId, condition: Condition) -> Result<()> {
        self.update_expression(id, |e| e.set_condition(condition))
    }

    /// Edit a leaf's expression in place. Notifies only when it actually changed.
    pub fn update_expression<F>(&mut self, id: NodeId, edit: F) -> Result<()>
    where
        F: FnOnce(&mut DataTypeExpression),
    {
        let condition = self.condition_mut(id)?;
        let before = condition.expression().clone();
        edit(condition.expression_mut());
        if *condition.expression() != before {
            self.raise(Some(id));
        }
        Ok(())
    }

    /// Bind a leaf to another property
    pub fn set_property(&mut self, id: NodeId, property: PropertyDescriptor<T>) -> Result<()> {
        let condition = self.condition_mut(id)?;
        if condition.property() == Some(&property) {
            return Ok(());
        }
        condition.set_property(property);
        self.raise(Some(id));
        Ok(())
    }

    fn condition_mut(&mut self, id: NodeId) -> Result<&mut PropertyCondition<T>> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(FilterError::NodeNotFound(id))?;
        match &mut node.kind {
            NodeKind::Condition(c) => Ok(c),
            NodeKind::Group(_) => Err(FilterError::NotACondition(id)),
        }
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Register a listener for "updated" notifications
    ///
    /// Listeners run after the notifier lock is released and may call back
    /// into the tree.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&TreeUpdate) + Send + Sync + 'static,
    {
        self.notifier.lock().subscribe(Arc::new(listener))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.notifier.lock().unsubscribe(id)
    }

    /// Number of notifications raised so far
    pub fn revision(&self) -> u64 {
        self.notifier.lock().revision()
    }

    /// Run several mutations as one logical change
    ///
    /// Listeners receive a single merged notification when the outermost
    /// batch ends, and none if nothing changed.
    pub fn batch<R, F>(&mut self, mutate: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.notifier.lock().suspend();
        let _resume = BatchGuard {
            notifier: Arc::clone(&self.notifier),
        };
        mutate(self)
    }

    /// Report a change at `origin` (or at the root list when `None`)
    pub(crate) fn raise(&self, origin: Option<NodeId>) {
        let path = self.path_to_root(origin);
        let dispatch = self.notifier.lock().raise(path);
        if let Some(dispatch) = dispatch {
            dispatch.deliver();
        }
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Every parent link is mirrored by a child entry and vice versa
    pub(crate) fn links_consistent(&self) -> bool {
        let roots_ok = self
            .roots
            .iter()
            .all(|r| self.nodes.get(r).is_some_and(|n| n.parent.is_none()));

        let nodes_ok = self.nodes.values().all(|node| {
            let parent_ok = match node.parent {
                Some(p) => self
                    .nodes
                    .get(&p)
                    .is_some_and(|pn| pn.children.contains(&node.id)),
                None => self.roots.contains(&node.id),
            };
            let children_ok = node
                .children
                .iter()
                .all(|c| self.nodes.get(c).is_some_and(|cn| cn.parent == Some(node.id)));
            parent_ok && children_ok
        });

        roots_ok && nodes_ok
    }
}

/// Ends a batch even when the mutation unwinds
struct BatchGuard {
    notifier: Arc<Mutex<Notifier>>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        let dispatch = self.notifier.lock().resume();
        if let Some(dispatch) = dispatch {
            if !std::thread::panicking() {
                dispatch.deliver();
            }
        }
    }
}

impl<T> Default for ConditionTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones structure and conditions. Listeners stay with the original.
impl<T> Clone for ConditionTree<T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            roots: self.roots.clone(),
            next_id: self.next_id,
            notifier: Arc::default(),
        }
    }
}

impl<T> std::fmt::Debug for ConditionTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionTree")
            .field("roots", &self.roots)
            .field("nodes", &self.walk().iter().map(|id| &self.nodes[id]).collect::<Vec<_>>())
            .finish()
    }
}
