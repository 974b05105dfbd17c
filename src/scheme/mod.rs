//! Named filter schemes
//!
//! A scheme is a titled condition tree over one target type. It is the
//! unit that gets saved, reloaded and applied to collections.

mod persist;

pub use persist::*;

use std::sync::Arc;

use crate::compiler::{compile, Predicate};
use crate::error::{FilterError, Result};
use crate::filter::{apply_predicate, FilterTarget};
use crate::property::PropertyProvider;
use crate::tree::{Combinator, ConditionTree, ResolutionSummary};

pub struct FilterScheme<T> {
    title: String,
    target_type: String,
    tree: ConditionTree<T>,
}

impl<T> FilterScheme<T> {
    /// New scheme holding a single empty And group
    pub fn new(title: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self::with_tree(title, target_type, ConditionTree::with_root_group(Combinator::And))
    }

    pub fn with_tree(
        title: impl Into<String>,
        target_type: impl Into<String>,
        tree: ConditionTree<T>,
    ) -> Self {
        Self {
            title: title.into(),
            target_type: target_type.into(),
            tree,
        }
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Type name the provider is asked about
    #[inline]
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    #[inline]
    pub fn tree(&self) -> &ConditionTree<T> {
        &self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut ConditionTree<T> {
        &mut self.tree
    }

    pub fn compile(&self) -> Result<Option<Predicate<T>>> {
        compile(&self.tree)
    }

    /// Rebuild `filtered` from the items of `raw` that pass the scheme
    pub fn apply<D>(&self, raw: &[T], filtered: &mut D) -> Result<usize>
    where
        T: Clone,
        D: FilterTarget<T> + ?Sized,
    {
        let predicate = self.compile()?;
        Ok(apply_predicate(predicate.as_ref(), raw, filtered))
    }

    /// Bind every unresolved leaf using `provider`
    pub fn ensure_integrity(&self, provider: &dyn PropertyProvider<T>) -> ResolutionSummary {
        let summary = self.tree.resolve_properties(provider);
        if summary.unresolved > 0 {
            tracing::debug!(
                scheme = %self.title,
                unresolved = summary.unresolved,
                "scheme has conditions on unknown properties"
            );
        }
        summary
    }
}

impl<T: 'static> FilterScheme<T> {
    /// `ensure_integrity` on tokio's blocking pool
    ///
    /// Several calls on the same scheme may run at once; each leaf is
    /// still looked up at most once.
    pub async fn ensure_integrity_async(
        scheme: Arc<Self>,
        provider: Arc<dyn PropertyProvider<T>>,
    ) -> Result<ResolutionSummary> {
        tokio::task::spawn_blocking(move || scheme.ensure_integrity(provider.as_ref()))
            .await
            .map_err(|e| FilterError::ResolutionTask(e.to_string()))
    }
}

impl<T> Clone for FilterScheme<T> {
    fn clone(&self) -> Self {
        Self {
            title: self.title.clone(),
            target_type: self.target_type.clone(),
            tree: self.tree.clone(),
        }
    }
}

impl<T> std::fmt::Debug for FilterScheme<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterScheme")
            .field("title", &self.title)
            .field("target_type", &self.target_type)
            .field("tree", &self.tree)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Condition, DataTypeExpression, NumericExpression, NumericType, StringExpression};
    use crate::filter::ObservableVec;
    use crate::property::{Number, PropertyRegistry};
    use crate::test_support::{person_properties, person_registry, property, Person};
    use crate::tree::PropertyCondition;

    fn contains(value: &str) -> PropertyCondition<Person> {
        PropertyCondition::with_expression(
            property("Name"),
            DataTypeExpression::String(StringExpression {
                selected_condition: Condition::Contains,
                value: Some(value.to_string()),
            }),
        )
    }

    fn age(condition: Condition, value: i64) -> PropertyCondition<Person> {
        PropertyCondition::with_expression(
            property("Age"),
            DataTypeExpression::Numeric(NumericExpression {
                numeric_type: NumericType::I32,
                selected_condition: condition,
                value: Some(Number::Signed(value)),
                is_nullable: true,
            }),
        )
    }

    #[test]
    fn test_new_scheme_has_root_group() {
        let scheme: FilterScheme<Person> = FilterScheme::new("All", "Person");
        assert_eq!(scheme.tree().roots().len(), 1);
        assert!(scheme.tree().group(scheme.tree().roots()[0]).is_ok());
    }

    #[test]
    fn test_scenario_name_contains() {
        let mut scheme = FilterScheme::new("oh", "Person");
        let root = scheme.tree().roots()[0];
        scheme.tree_mut().add_condition(Some(root), contains("oh")).unwrap();

        let raw = vec![Person::named("John"), Person::named("Anna"), Person::default()];
        let mut filtered = Vec::new();
        assert_eq!(scheme.apply(&raw, &mut filtered).unwrap(), 1);
        assert_eq!(filtered, vec![Person::named("John")]);
    }

    #[test]
    fn test_scenario_working_age() {
        let mut scheme = FilterScheme::new("Working age", "Person");
        let root = scheme.tree().roots()[0];
        scheme
            .tree_mut()
            .batch(|tree| {
                tree.add_condition(Some(root), age(Condition::GreaterThanOrEqualTo, 18))?;
                tree.add_condition(Some(root), age(Condition::LessThan, 65))
            })
            .unwrap();

        let raw: Vec<_> = [Some(17), Some(18), Some(64), Some(65), None]
            .into_iter()
            .map(Person::aged)
            .collect();
        let mut filtered = ObservableVec::new();
        scheme.apply(&raw, &mut filtered).unwrap();
        let ages: Vec<_> = filtered.iter().map(|p| p.age).collect();
        assert_eq!(ages, vec![Some(18), Some(64)]);
    }

    #[test]
    fn test_scenario_empty_or_group_passes_all() {
        let mut scheme: FilterScheme<Person> = FilterScheme::new("Any", "Person");
        let root = scheme.tree().roots()[0];
        scheme.tree_mut().set_combinator(root, Combinator::Or).unwrap();

        let raw: Vec<_> = (0..5).map(|i| Person::aged(Some(i))).collect();
        let mut filtered = Vec::new();
        assert_eq!(scheme.apply(&raw, &mut filtered).unwrap(), 5);
        assert_eq!(filtered, raw);
    }

    #[test]
    fn test_ensure_integrity_reports_unresolved() {
        let scheme: FilterScheme<Person> = FilterScheme::from_persisted(PersistedScheme {
            title: "t".into(),
            target_type: "Person".into(),
            items: vec![PersistedNode::Property {
                property: "Person||Name".into(),
                expression: DataTypeExpression::String(StringExpression::default()),
            }],
        })
        .unwrap();

        let empty: PropertyRegistry<Person> = PropertyRegistry::new();
        assert_eq!(scheme.ensure_integrity(&empty).unresolved, 1);
        assert_eq!(scheme.ensure_integrity(&person_registry()).resolved, 1);
    }

    #[tokio::test]
    async fn test_ensure_integrity_async() {
        let json = {
            let mut scheme = FilterScheme::new("async", "Person");
            let root = scheme.tree().roots()[0];
            scheme.tree_mut().add_condition(Some(root), contains("a")).unwrap();
            scheme.tree_mut().add_condition(Some(root), age(Condition::LessThan, 3)).unwrap();
            scheme.to_json().unwrap()
        };
        let scheme: Arc<FilterScheme<Person>> = Arc::new(FilterScheme::from_json(&json).unwrap());
        let registry = PropertyRegistry::new();
        registry.register("Person", person_properties());
        let provider: Arc<dyn PropertyProvider<Person>> = Arc::new(registry);

        let (a, b) = tokio::join!(
            FilterScheme::ensure_integrity_async(Arc::clone(&scheme), Arc::clone(&provider)),
            FilterScheme::ensure_integrity_async(Arc::clone(&scheme), Arc::clone(&provider)),
        );
        assert_eq!(a.unwrap().resolved, 2);
        assert_eq!(b.unwrap().resolved, 2);
        assert!(scheme
            .tree()
            .conditions()
            .iter()
            .all(|&id| scheme.tree().is_valid(id)));
    }
}
