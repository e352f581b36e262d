//! Entity trait: identity that stays stable across a run.

/// Entity marker + minimal interface.
///
/// Jobs and machines are entities: two records with the same id refer to the
/// same thing, so an input batch must never contain the same id twice.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Returns every id that occurs more than once in `items`, in first-repeat order.
pub fn duplicate_ids<E: Entity>(items: &[E]) -> Vec<E::Id> {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    let mut dupes: Vec<E::Id> = Vec::new();
    for item in items {
        let id = item.id();
        if !seen.insert(id.clone()) && !dupes.contains(id) {
            dupes.push(id.clone());
        }
    }
    dupes
}
