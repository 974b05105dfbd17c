//! Document model for saved filter schemes
//!
//! Leaves are stored by `Type||Property` reference and reloaded
//! unresolved; call `FilterScheme::ensure_integrity` after loading.

use serde::{Deserialize, Serialize};

use crate::condition::DataTypeExpression;
use crate::error::Result;
use crate::tree::{Combinator, ConditionTree, NodeId, NodeKind, PropertyCondition};

use super::FilterScheme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedScheme {
    pub title: String,
    pub target_type: String,
    #[serde(default)]
    pub items: Vec<PersistedNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PersistedNode {
    Group {
        combinator: Combinator,
        #[serde(default)]
        items: Vec<PersistedNode>,
    },
    Property {
        property: String,
        expression: DataTypeExpression,
    },
}

impl<T> FilterScheme<T> {
    pub fn to_persisted(&self) -> PersistedScheme {
        let tree = self.tree();
        PersistedScheme {
            title: self.title().to_string(),
            target_type: self.target_type().to_string(),
            items: tree.roots().iter().map(|&id| persist_node(tree, id)).collect(),
        }
    }

    /// Rebuild a scheme; every leaf comes back unresolved
    pub fn from_persisted(document: PersistedScheme) -> Result<Self> {
        let mut tree = ConditionTree::new();
        for item in document.items {
            restore_node(&mut tree, None, item)?;
        }
        Ok(Self::with_tree(document.title, document.target_type, tree))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_persisted())?)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let document: PersistedScheme = serde_json::from_str(input)?;
        Self::from_persisted(document)
    }
}

fn persist_node<T>(tree: &ConditionTree<T>, id: NodeId) -> PersistedNode {
    match tree.get(id).map(|n| n.kind()) {
        Some(NodeKind::Condition(condition)) => PersistedNode::Property {
            property: condition.reference().unwrap_or_default(),
            expression: condition.expression().clone(),
        },
        Some(NodeKind::Group(group)) => PersistedNode::Group {
            combinator: group.combinator,
            items: tree
                .children(id)
                .iter()
                .map(|&child| persist_node(tree, child))
                .collect(),
        },
        None => PersistedNode::Group {
            combinator: Combinator::And,
            items: Vec::new(),
        },
    }
}

fn restore_node<T>(
    tree: &mut ConditionTree<T>,
    parent: Option<NodeId>,
    node: PersistedNode,
) -> Result<NodeId> {
    match node {
        PersistedNode::Group { combinator, items } => {
            let id = tree.add_group(parent, combinator)?;
            for item in items {
                restore_node(tree, Some(id), item)?;
            }
            Ok(id)
        }
        PersistedNode::Property {
            property,
            expression,
        } => tree.add_condition(parent, PropertyCondition::unresolved(property, expression)),
    }
}
