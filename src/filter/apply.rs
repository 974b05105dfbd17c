//! Running a compiled filter over a collection

use std::time::Instant;

use crate::compiler::{compile, evaluate, Predicate};
use crate::error::Result;
use crate::tree::ConditionTree;

/// Destination of a filter run
///
/// `begin_update`/`end_update` bracket every rebuild so targets that
/// notify observers can report the whole rebuild as one change.
pub trait FilterTarget<T> {
    fn begin_update(&mut self) {}

    fn end_update(&mut self) {}

    fn clear(&mut self);

    fn push(&mut self, item: T);
}

impl<T> FilterTarget<T> for Vec<T> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push(&mut self, item: T) {
        Vec::push(self, item);
    }
}

/// Compile `tree` and rebuild `destination` from the matching items of `source`
///
/// Compilation happens first, so on error `destination` is untouched.
/// Returns the number of matches.
pub fn apply<T, D>(tree: &ConditionTree<T>, source: &[T], destination: &mut D) -> Result<usize>
where
    T: Clone,
    D: FilterTarget<T> + ?Sized,
{
    let predicate = compile(tree)?;
    Ok(apply_predicate(predicate.as_ref(), source, destination))
}

/// Rebuild `destination` with the items of `source` accepted by `predicate`, in source order
///
/// An absent predicate copies everything.
pub fn apply_predicate<T, D>(
    predicate: Option<&Predicate<T>>,
    source: &[T],
    destination: &mut D,
) -> usize
where
    T: Clone,
    D: FilterTarget<T> + ?Sized,
{
    let start = Instant::now();

    destination.begin_update();
    destination.clear();
    let mut matched = 0;
    for item in source {
        if evaluate(predicate, item) {
            destination.push(item.clone());
            matched += 1;
        }
    }
    destination.end_update();

    tracing::debug!(
        items = source.len(),
        matched,
        elapsed_us = start.elapsed().as_micros() as u64,
        "filter applied"
    );
    matched
}
