//! Lazy property resolution
//!
//! A leaf rebuilt from its persisted form only knows a `Type||Property`
//! reference. Resolution binds it to a descriptor. The property slot is a
//! `OnceCell`: concurrent attempts on the same leaf block on each other
//! and at most one lookup succeeds, while different leaves resolve
//! independently. A failed lookup leaves the slot empty so it can be
//! retried later.

use crate::error::Result;
use crate::property::{PropertyDescriptor, PropertyProvider, PropertyReference};

use super::arena::ConditionTree;
use super::node::{NodeId, PropertyCondition};

/// Outcome of resolving every leaf of a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Leaves bound to a property after the call
    pub resolved: usize,
    /// Leaves still unresolved
    pub unresolved: usize,
}

impl<T> PropertyCondition<T> {
    /// Bind the property from `provider` unless already bound.
    ///
    /// Returns `(resolved, newly_resolved)`.
    fn ensure_resolved(&self, provider: &dyn PropertyProvider<T>) -> (bool, bool) {
        let mut newly = false;
        let resolved = self
            .property
            .get_or_try_init(|| {
                let found = self.lookup(provider).ok_or(())?;
                newly = true;
                Ok::<_, ()>(found)
            })
            .is_ok();
        (resolved, newly)
    }

    fn lookup(&self, provider: &dyn PropertyProvider<T>) -> Option<PropertyDescriptor<T>> {
        let raw = self.reference()?;
        let Some(reference) = PropertyReference::parse(&raw) else {
            tracing::debug!(reference = %raw, "malformed property reference");
            return None;
        };

        let Some(properties) = provider.instance_properties(&reference.type_name) else {
            tracing::debug!(type_name = %reference.type_name, "unknown type, leaving condition unresolved");
            return None;
        };

        let property = properties.get(&reference.property_name).cloned();
        if property.is_none() {
            tracing::debug!(%reference, "property no longer exists, leaving condition unresolved");
        }
        property
    }
}

impl<T> ConditionTree<T> {
    /// Resolve one leaf. Returns whether it is bound after the call.
    pub fn resolve_node(&self, id: NodeId, provider: &dyn PropertyProvider<T>) -> Result<bool> {
        let condition = self.condition(id)?;
        let (resolved, newly) = condition.ensure_resolved(provider);
        if newly {
            self.raise(Some(id));
        }
        Ok(resolved)
    }

    /// Resolve every unresolved leaf
    pub fn resolve_properties(&self, provider: &dyn PropertyProvider<T>) -> ResolutionSummary {
        let mut summary = ResolutionSummary::default();
        for id in self.conditions() {
            match self.resolve_node(id, provider) {
                Ok(true) => summary.resolved += 1,
                Ok(false) | Err(_) => summary.unresolved += 1,
            }
        }
        summary
    }
}
