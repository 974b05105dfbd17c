//! Tree-to-predicate compilation
//!
//! Leaves that cannot be evaluated yet (unresolved property, missing
//! operand) compile to nothing and drop out of their group. Groups fold
//! whatever remains left to right, so `[a, b, c]` under And becomes
//! `((a AND b) AND c)`. Root nodes fold the same way under And.
//!
//! Nothing is cached: each call rebuilds from the current tree.

use crate::error::Result;
use crate::tree::{Combinator, ConditionTree, NodeId, NodeKind, PropertyCondition};

use super::predicate::{CompiledCondition, Predicate};
use super::rule::LeafRule;

/// Compile the whole tree. `None` means every item passes.
pub fn compile<T>(tree: &ConditionTree<T>) -> Result<Option<Predicate<T>>> {
    let mut parts = Vec::with_capacity(tree.roots().len());
    for &root in tree.roots() {
        if let Some(predicate) = compile_node(tree, root)? {
            parts.push(predicate);
        }
    }
    Ok(fold(Combinator::And, parts))
}

/// Compile the subtree rooted at `id`
pub fn compile_node<T>(tree: &ConditionTree<T>, id: NodeId) -> Result<Option<Predicate<T>>> {
    let node = tree.node(id)?;
    match node.kind() {
        NodeKind::Group(group) => {
            let mut parts = Vec::with_capacity(node.children().len());
            for &child in node.children() {
                if let Some(predicate) = compile_node(tree, child)? {
                    parts.push(predicate);
                }
            }
            Ok(fold(group.combinator, parts))
        }
        NodeKind::Condition(condition) => compile_condition(id, condition),
    }
}

fn compile_condition<T>(id: NodeId, condition: &PropertyCondition<T>) -> Result<Option<Predicate<T>>> {
    let Some(property) = condition.property() else {
        tracing::debug!(node = %id, reference = ?condition.reference(), "skipping unresolved condition");
        return Ok(None);
    };

    let expression = condition.expression();
    if property.kind() != expression.value_kind() {
        tracing::warn!(
            node = %id,
            property = %property,
            property_kind = %property.kind(),
            expression_kind = %expression.value_kind(),
            "property kind does not match its expression, skipping condition"
        );
        return Ok(None);
    }

    match LeafRule::compile(expression, property.is_nullable())? {
        Some(rule) => Ok(Some(Predicate::Leaf(CompiledCondition::new(
            property.clone(),
            expression.clone(),
            rule,
        )))),
        None => {
            tracing::debug!(node = %id, %expression, "skipping condition without a usable operand");
            Ok(None)
        }
    }
}

/// Left fold; a single part passes through unchanged
fn fold<T>(combinator: Combinator, parts: Vec<Predicate<T>>) -> Option<Predicate<T>> {
    parts.into_iter().reduce(|acc, next| match combinator {
        Combinator::And => Predicate::And(Box::new(acc), Box::new(next)),
        Combinator::Or => Predicate::Or(Box::new(acc), Box::new(next)),
    })
}

impl<T> ConditionTree<T> {
    /// Shorthand for [`compile`]
    pub fn compile(&self) -> Result<Option<Predicate<T>>> {
        compile(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::evaluate;
    use crate::condition::{
        Condition, DataTypeExpression, DateTimeExpression, NumericExpression, NumericType,
        StringExpression, ValueKind,
    };
    use crate::error::FilterError;
    use crate::property::Number;
    use crate::test_support::{date, init_tracing, property, Person};

    fn name(condition: Condition, value: &str) -> PropertyCondition<Person> {
        PropertyCondition::with_expression(
            property("Name"),
            DataTypeExpression::String(StringExpression {
                selected_condition: condition,
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

    fn on_date(name: &str, condition: Condition) -> PropertyCondition<Person> {
        PropertyCondition::with_expression(
            property(name),
            DataTypeExpression::DateTime(DateTimeExpression {
                selected_condition: condition,
                value: Some(date(2000, 1, 1)),
                is_nullable: true,
            }),
        )
    }

    fn born(born: Option<chrono::NaiveDateTime>) -> Person {
        Person {
            born,
            ..Person::default()
        }
    }

    fn filter<'a>(tree: &ConditionTree<Person>, people: &'a [Person]) -> Vec<&'a Person> {
        let predicate = compile(tree).unwrap();
        people
            .iter()
            .filter(|p| evaluate(predicate.as_ref(), *p))
            .collect()
    }

    #[test]
    fn test_name_contains() {
        let mut tree: ConditionTree<Person> = ConditionTree::with_root_group(Combinator::And);
        let root = tree.roots()[0];
        tree.add_condition(Some(root), name(Condition::Contains, "oh")).unwrap();

        let people = vec![Person::named("John"), Person::named("Anna"), Person::default()];
        let matched = filter(&tree, &people);
        assert_eq!(matched, vec![&people[0]]);
    }

    #[test]
    fn test_age_range() {
        let mut tree: ConditionTree<Person> = ConditionTree::with_root_group(Combinator::And);
        let root = tree.roots()[0];
        tree.add_condition(Some(root), age(Condition::GreaterThanOrEqualTo, 18)).unwrap();
        tree.add_condition(Some(root), age(Condition::LessThan, 65)).unwrap();

        let people: Vec<_> = [Some(17), Some(18), Some(64), Some(65), None]
            .into_iter()
            .map(Person::aged)
            .collect();
        let ages: Vec<_> = filter(&tree, &people).iter().map(|p| p.age).collect();
        assert_eq!(ages, vec![Some(18), Some(64)]);
    }

    #[test]
    fn test_empty_group_accepts_everything() {
        let tree: ConditionTree<Person> = ConditionTree::with_root_group(Combinator::Or);
        assert!(compile(&tree).unwrap().is_none());

        let people: Vec<_> = (0..5).map(|i| Person::aged(Some(i))).collect();
        assert_eq!(filter(&tree, &people).len(), 5);
    }

    #[test]
    fn test_empty_tree_is_absent() {
        let tree: ConditionTree<Person> = ConditionTree::new();
        assert!(compile(&tree).unwrap().is_none());
    }

    #[test]
    fn test_unresolved_leaves_are_absent() {
        init_tracing();
        let mut tree: ConditionTree<Person> = ConditionTree::with_root_group(Combinator::And);
        let root = tree.roots()[0];
        let expression = DataTypeExpression::for_kind(ValueKind::String, true);
        tree.add_condition(Some(root), PropertyCondition::unresolved("Person||Name", expression))
            .unwrap();
        assert!(compile(&tree).unwrap().is_none());
    }

    #[test]
    fn test_fold_is_left_associative() {
        let mut tree: ConditionTree<Person> = ConditionTree::with_root_group(Combinator::Or);
        let root = tree.roots()[0];
        tree.add_condition(Some(root), age(Condition::GreaterThan, 1)).unwrap();
        tree.add_condition(Some(root), age(Condition::LessThan, 9)).unwrap();
        tree.add_condition(Some(root), name(Condition::EqualTo, "x")).unwrap();

        let predicate = compile(&tree).unwrap().unwrap();
        assert_eq!(
            predicate.to_string(),
            "((Age GreaterThan 1 OR Age LessThan 9) OR Name EqualTo \"x\")"
        );
        assert_eq!(predicate.leaf_count(), 3);
    }

    #[test]
    fn test_single_child_passes_through() {
        let mut tree: ConditionTree<Person> = ConditionTree::with_root_group(Combinator::And);
        let root = tree.roots()[0];
        let inner = tree.add_group(Some(root), Combinator::Or).unwrap();
        tree.add_condition(Some(inner), age(Condition::EqualTo, 3)).unwrap();

        let predicate = compile(&tree).unwrap().unwrap();
        assert!(matches!(predicate, Predicate::Leaf(_)));
    }

    #[test]
    fn test_absent_children_drop_out_of_group() {
        let mut tree: ConditionTree<Person> = ConditionTree::with_root_group(Combinator::And);
        let root = tree.roots()[0];
        tree.add_group(Some(root), Combinator::Or).unwrap();
        tree.add_condition(Some(root), age(Condition::EqualTo, 3)).unwrap();

        let predicate = compile(&tree).unwrap().unwrap();
        assert_eq!(predicate.to_string(), "Age EqualTo 3");
    }

    #[test]
    fn test_multiple_roots_are_anded() {
        let mut tree: ConditionTree<Person> = ConditionTree::new();
        tree.add_condition(None, age(Condition::GreaterThan, 10)).unwrap();
        tree.add_condition(None, age(Condition::LessThan, 20)).unwrap();

        let people: Vec<_> = [5, 15, 25].into_iter().map(|a| Person::aged(Some(a))).collect();
        let ages: Vec<_> = filter(&tree, &people).iter().map(|p| p.age).collect();
        assert_eq!(ages, vec![Some(15)]);
    }

    #[test]
    fn test_unsupported_condition_fails_compile() {
        let mut tree: ConditionTree<Person> = ConditionTree::with_root_group(Combinator::And);
        let root = tree.roots()[0];
        let leaf = tree.add_condition(Some(root), age(Condition::EqualTo, 1)).unwrap();
        tree.set_condition(leaf, Condition::Contains).unwrap();

        let err = compile(&tree).unwrap_err();
        assert_eq!(
            err,
            FilterError::unsupported(Condition::Contains, ValueKind::Numeric(NumericType::I32))
        );
    }

    #[test]
    fn test_unsupported_condition_on_unresolved_leaf_is_ignored() {
        let mut tree: ConditionTree<Person> = ConditionTree::new();
        let mut expression = DataTypeExpression::for_kind(ValueKind::Boolean, false);
        expression.set_condition(Condition::Matches);
        tree.add_condition(None, PropertyCondition::unresolved("Person||Active", expression))
            .unwrap();
        assert!(compile(&tree).unwrap().is_none());
    }

    #[test]
    fn test_kind_mismatch_is_absent() {
        init_tracing();
        let mut tree: ConditionTree<Person> = ConditionTree::new();
        let expression = DataTypeExpression::for_kind(ValueKind::Boolean, false);
        tree.add_condition(None, PropertyCondition::with_expression(property("Name"), expression))
            .unwrap();
        assert!(compile(&tree).unwrap().is_none());
    }

    #[test]
    fn test_non_nullable_is_null_is_constant_false() {
        let mut tree: ConditionTree<Person> = ConditionTree::new();
        let leaf = tree
            .add_condition(None, PropertyCondition::new(property("Score")))
            .unwrap();
        tree.set_condition(leaf, Condition::IsNull).unwrap();

        let predicate = tree.compile().unwrap().unwrap();
        assert!(!predicate.matches(&Person::default()));
    }

    #[test]
    fn test_compile_reflects_latest_edit() {
        let mut tree: ConditionTree<Person> = ConditionTree::new();
        let leaf = tree.add_condition(None, age(Condition::GreaterThan, 30)).unwrap();
        let young = Person::aged(Some(20));
        assert!(!compile(&tree).unwrap().unwrap().matches(&young));

        tree.set_condition(leaf, Condition::LessThan).unwrap();
        assert!(compile(&tree).unwrap().unwrap().matches(&young));
    }

    #[test]
    fn test_date_time_null_handling() {
        let people = vec![
            born(None),
            born(Some(date(1990, 5, 1))),
            born(Some(date(2010, 5, 1))),
        ];
        let matching = |condition| {
            let mut tree: ConditionTree<Person> = ConditionTree::new();
            tree.add_condition(None, on_date("Born", condition)).unwrap();
            filter(&tree, &people).iter().map(|p| p.born).collect::<Vec<_>>()
        };

        assert_eq!(matching(Condition::IsNull), vec![None]);
        assert_eq!(
            matching(Condition::NotIsNull),
            vec![Some(date(1990, 5, 1)), Some(date(2010, 5, 1))]
        );
        assert_eq!(
            matching(Condition::NotEqualTo),
            vec![None, Some(date(1990, 5, 1)), Some(date(2010, 5, 1))]
        );
        assert_eq!(matching(Condition::GreaterThan), vec![Some(date(2010, 5, 1))]);
        assert_eq!(matching(Condition::LessThanOrEqualTo), vec![Some(date(1990, 5, 1))]);
    }

    #[test]
    fn test_non_nullable_date_time_null_checks_are_constant() {
        let joined = Person {
            joined: date(1995, 3, 3),
            ..Person::default()
        };

        let mut tree: ConditionTree<Person> = ConditionTree::new();
        let leaf = tree.add_condition(None, on_date("Joined", Condition::IsNull)).unwrap();
        let predicate = tree.compile().unwrap().unwrap();
        assert!(!predicate.matches(&joined));
        assert!(!predicate.matches(&Person::default()));

        tree.set_condition(leaf, Condition::NotIsNull).unwrap();
        let predicate = tree.compile().unwrap().unwrap();
        assert!(predicate.matches(&joined));
        assert!(predicate.matches(&Person::default()));
    }
}
