//! Interactive filter editing
//!
//! A session owns a scheme, the raw items and a preview collection. Edits
//! go through the session so that, with live preview on, every edit that
//! changed the tree recompiles the scheme and rebuilds the preview. A
//! failed compile keeps the previous preview and is reported through
//! `last_error`.

use std::sync::Arc;

use crate::condition::{Condition, DataTypeExpression};
use crate::config::FilterSettings;
use crate::error::{FilterError, Result};
use crate::filter::ObservableVec;
use crate::property::{PropertyDescriptor, PropertyProvider};
use crate::scheme::FilterScheme;
use crate::tree::{Combinator, ConditionTree, NodeId, PropertyCondition};

pub struct FilterSession<T> {
    scheme: FilterScheme<T>,
    provider: Arc<dyn PropertyProvider<T>>,
    settings: FilterSettings,
    raw: Vec<T>,
    preview: ObservableVec<T>,
    live_preview: bool,
    last_error: Option<FilterError>,
}

impl<T: Clone> FilterSession<T> {
    /// Start editing `scheme`. Unresolved leaves are bound first.
    pub fn new(
        scheme: FilterScheme<T>,
        raw: Vec<T>,
        provider: Arc<dyn PropertyProvider<T>>,
        settings: FilterSettings,
    ) -> Self {
        scheme.ensure_integrity(provider.as_ref());
        let live_preview = settings.live_preview();
        let mut session = Self {
            scheme,
            provider,
            settings,
            raw,
            preview: ObservableVec::new(),
            live_preview,
            last_error: None,
        };
        if session.live_preview {
            // Failures are recorded in last_error
            let _ = session.update_preview();
        }
        session
    }

    #[inline]
    pub fn scheme(&self) -> &FilterScheme<T> {
        &self.scheme
    }

    #[inline]
    pub fn tree(&self) -> &ConditionTree<T> {
        self.scheme.tree()
    }

    #[inline]
    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    #[inline]
    pub fn preview(&self) -> &ObservableVec<T> {
        &self.preview
    }

    /// Mutable access for subscribing to preview changes
    pub fn preview_mut(&mut self) -> &mut ObservableVec<T> {
        &mut self.preview
    }

    #[inline]
    pub fn raw_items(&self) -> &[T] {
        &self.raw
    }

    /// Error of the most recent preview run, if it failed
    #[inline]
    pub fn last_error(&self) -> Option<&FilterError> {
        self.last_error.as_ref()
    }

    #[inline]
    pub fn is_live_preview(&self) -> bool {
        self.live_preview
    }

    /// Turn live preview on or off. Has no effect when the settings forbid it.
    pub fn set_live_preview(&mut self, enabled: bool) {
        let enabled = enabled && self.settings.allow_live_preview;
        if enabled == self.live_preview {
            return;
        }
        self.live_preview = enabled;
        if enabled {
            let _ = self.update_preview();
        }
    }

    /// Replace the raw items and refresh the preview when live
    pub fn set_raw_items(&mut self, raw: Vec<T>) {
        self.raw = raw;
        if self.live_preview {
            let _ = self.update_preview();
        }
    }

    /// Recompile the scheme and rebuild the preview
    pub fn update_preview(&mut self) -> Result<usize> {
        match self.scheme.apply(&self.raw, &mut self.preview) {
            Ok(matched) => {
                self.last_error = None;
                Ok(matched)
            }
            Err(err) => {
                tracing::warn!(scheme = %self.scheme.title(), error = %err, "preview not updated");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Add a group using the configured default combinator
    pub fn add_group(&mut self, parent: Option<NodeId>) -> Result<NodeId> {
        let combinator = self.settings.default_combinator;
        self.edit(|tree| tree.add_group(parent, combinator))
    }

    /// Add a leaf bound to the first property of the target type
    pub fn add_expression(&mut self, parent: Option<NodeId>) -> Result<NodeId> {
        let property = self.first_property()?;
        self.edit(|tree| tree.add_condition(parent, PropertyCondition::new(property)))
    }

    /// Non-root nodes are always deletable; a root only while others remain
    pub fn can_delete(&self, id: NodeId) -> bool {
        let tree = self.scheme.tree();
        if !tree.contains(id) {
            return false;
        }
        !tree.is_root(id) || !self.settings.require_root_condition || tree.roots().len() > 1
    }

    /// Delete `id` and its subtree. Returns `false` when deletion is not allowed.
    pub fn delete(&mut self, id: NodeId) -> Result<bool> {
        self.scheme.tree().node(id)?;
        if !self.can_delete(id) {
            tracing::debug!(node = %id, "refusing to delete the last top-level node");
            return Ok(false);
        }
        self.edit(|tree| tree.remove(id))?;
        Ok(true)
    }

    pub fn set_combinator(&mut self, id: NodeId, combinator: Combinator) -> Result<()> {
        self.edit(|tree| tree.set_combinator(id, combinator))
    }

    pub fn set_condition(&mut self, id: NodeId, condition: Condition) -> Result<()> {
        self.edit(|tree| tree.set_condition(id, condition))
    }

    pub fn update_expression<F>(&mut self, id: NodeId, edit: F) -> Result<()>
    where
        F: FnOnce(&mut DataTypeExpression),
    {
        self.edit(|tree| tree.update_expression(id, edit))
    }

    pub fn set_property(&mut self, id: NodeId, property: PropertyDescriptor<T>) -> Result<()> {
        self.edit(|tree| tree.set_property(id, property))
    }

    /// Bind a leaf to a property of the target type by name
    pub fn set_property_by_name(&mut self, id: NodeId, name: &str) -> Result<()> {
        let property = self
            .provider
            .instance_properties(self.scheme.target_type())
            .and_then(|props| props.get(name).cloned())
            .ok_or_else(|| {
                FilterError::InvalidPropertyReference(format!(
                    "{}||{}",
                    self.scheme.target_type(),
                    name
                ))
            })?;
        self.set_property(id, property)
    }

    pub fn into_scheme(self) -> FilterScheme<T> {
        self.scheme
    }

    fn first_property(&self) -> Result<PropertyDescriptor<T>> {
        let target = self.scheme.target_type();
        self.provider
            .instance_properties(target)
            .and_then(|props| props.first().cloned())
            .ok_or_else(|| FilterError::NoProperties(target.to_string()))
    }

    /// Run one tree edit as a batch; refresh the preview if the tree changed
    fn edit<R, F>(&mut self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut ConditionTree<T>) -> Result<R>,
    {
        let before = self.scheme.tree().revision();
        let result = self.scheme.tree_mut().batch(mutate)?;
        if self.live_preview && self.scheme.tree().revision() != before {
            let _ = self.update_preview();
        }
        Ok(result)
    }
}

impl<T> std::fmt::Debug for FilterSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSession")
            .field("scheme", &self.scheme)
            .field("settings", &self.settings)
            .field("raw", &self.raw.len())
            .field("preview", &self.preview.len())
            .field("live_preview", &self.live_preview)
            .field("last_error", &self.last_error)
            .finish()
    }
}
