//! Condition tree nodes

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::condition::DataTypeExpression;
use crate::property::{PropertyDescriptor, PropertyReference};

/// Stable identifier of a node within one tree. Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a group combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => f.write_str("AND"),
            Combinator::Or => f.write_str("OR"),
        }
    }
}

/// Group node: children joined by one combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConditionGroup {
    pub combinator: Combinator,
}

impl ConditionGroup {
    pub fn new(combinator: Combinator) -> Self {
        Self { combinator }
    }
}

// ============================================================================
// Property Condition
// ============================================================================

/// Leaf node: a property bound to a leaf expression
///
/// The property may be unresolved (only a persisted reference is known).
/// Resolution fills the slot at most once; see `ConditionTree::resolve_node`.
pub struct PropertyCondition<T> {
    reference: Option<String>,
    pub(crate) property: OnceCell<PropertyDescriptor<T>>,
    expression: DataTypeExpression,
}

impl<T> PropertyCondition<T> {
    /// Condition on `property` with the default expression for its kind
    pub fn new(property: PropertyDescriptor<T>) -> Self {
        let expression = DataTypeExpression::for_kind(property.kind(), property.is_nullable());
        Self::with_expression(property, expression)
    }

    /// Condition on `property` with an explicit expression
    pub fn with_expression(property: PropertyDescriptor<T>, expression: DataTypeExpression) -> Self {
        Self {
            reference: Some(PropertyReference::for_descriptor(&property).to_string()),
            property: OnceCell::with_value(property),
            expression,
        }
    }

    /// Condition known only by its persisted `Type||Property` reference
    pub fn unresolved(reference: impl Into<String>, expression: DataTypeExpression) -> Self {
        Self {
            reference: Some(reference.into()),
            property: OnceCell::new(),
            expression,
        }
    }

    #[inline]
    pub fn property(&self) -> Option<&PropertyDescriptor<T>> {
        self.property.get()
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.property.get().is_some()
    }

    /// Persisted reference string, derived from the property once resolved
    pub fn reference(&self) -> Option<String> {
        match self.property.get() {
            Some(p) => Some(PropertyReference::for_descriptor(p).to_string()),
            None => self.reference.clone(),
        }
    }

    #[inline]
    pub fn expression(&self) -> &DataTypeExpression {
        &self.expression
    }

    pub(crate) fn expression_mut(&mut self) -> &mut DataTypeExpression {
        &mut self.expression
    }

    /// Bind another property
    ///
    /// The expression is replaced by the default for the new kind when the
    /// kind changes; otherwise only its nullability is updated.
    pub(crate) fn set_property(&mut self, property: PropertyDescriptor<T>) {
        if self.expression.value_kind() == property.kind() {
            self.expression.set_nullable(property.is_nullable());
        } else {
            self.expression = DataTypeExpression::for_kind(property.kind(), property.is_nullable());
        }
        self.reference = Some(PropertyReference::for_descriptor(&property).to_string());
        self.property = OnceCell::with_value(property);
    }

    /// Resolved, expression kind agrees with the property, operand usable
    pub fn is_valid(&self) -> bool {
        match self.property.get() {
            Some(p) => p.kind() == self.expression.value_kind() && self.expression.is_valid(),
            None => false,
        }
    }
}

impl<T> Clone for PropertyCondition<T> {
    fn clone(&self) -> Self {
        Self {
            reference: self.reference.clone(),
            property: self.property.clone(),
            expression: self.expression.clone(),
        }
    }
}

impl<T> fmt::Debug for PropertyCondition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCondition")
            .field("reference", &self.reference())
            .field("resolved", &self.is_resolved())
            .field("expression", &self.expression)
            .finish()
    }
}

// ============================================================================
// Node
// ============================================================================

/// Closed set of node variants
pub enum NodeKind<T> {
    Group(ConditionGroup),
    Condition(PropertyCondition<T>),
}

impl<T> Clone for NodeKind<T> {
    fn clone(&self) -> Self {
        match self {
            NodeKind::Group(g) => NodeKind::Group(*g),
            NodeKind::Condition(c) => NodeKind::Condition(c.clone()),
        }
    }
}

impl<T> fmt::Debug for NodeKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Group(g) => f.debug_tuple("Group").field(g).finish(),
            NodeKind::Condition(c) => f.debug_tuple("Condition").field(c).finish(),
        }
    }
}

/// Arena entry: variant plus structural links
pub struct Node<T> {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) kind: NodeKind<T>,
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            parent: self.parent,
            children: self.children.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("kind", &self.kind)
            .finish()
    }
}

impl<T> Node<T> {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, kind: NodeKind<T>) -> Self {
        Self {
            id,
            parent,
            children: SmallVec::new(),
            kind,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind<T> {
        &self.kind
    }

    pub fn as_group(&self) -> Option<&ConditionGroup> {
        match &self.kind {
            NodeKind::Group(g) => Some(g),
            NodeKind::Condition(_) => None,
        }
    }

    pub fn as_condition(&self) -> Option<&PropertyCondition<T>> {
        match &self.kind {
            NodeKind::Condition(c) => Some(c),
            NodeKind::Group(_) => None,
        }
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }
}
