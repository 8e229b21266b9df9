//! In-memory materialized view of SPC snapshots
//!
//! One snapshot per (recipe, parameter, period start); recomputation
//! replaces the prior snapshot. Writes are serialized by the store's
//! mutex, so two concurrent recomputations for the same key cannot
//! interleave — the later writer wins with a complete snapshot. A
//! caller with a real database replaces this with a transactional
//! upsert on the same key.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::core::identity::EntityId;
use crate::entities::spc_data::SpcData;

/// Upsert key of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpcKey {
    pub recipe_id: EntityId,
    pub parameter: String,
    pub period_start: DateTime<Utc>,
}

impl SpcKey {
    /// Key of a computed snapshot
    pub fn of(snapshot: &SpcData) -> Self {
        Self {
            recipe_id: snapshot.recipe_id.clone(),
            parameter: snapshot.parameter.clone(),
            period_start: snapshot.period_start,
        }
    }
}

/// Materialized view of SPC snapshots, keyed by (recipe, parameter, period)
#[derive(Debug, Default)]
pub struct SpcStore {
    snapshots: Mutex<BTreeMap<SpcKey, SpcData>>,
}

impl SpcStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the snapshot for its key. Returns the replaced
    /// snapshot, if any.
    pub fn upsert(&self, snapshot: SpcData) -> Option<SpcData> {
        let key = SpcKey::of(&snapshot);
        let mut snapshots = self.snapshots.lock().expect("spc store poisoned");
        snapshots.insert(key, snapshot)
    }

    /// Fetch the current snapshot for a key
    pub fn get(&self, key: &SpcKey) -> Option<SpcData> {
        let snapshots = self.snapshots.lock().expect("spc store poisoned");
        snapshots.get(key).cloned()
    }

    /// All snapshots for one recipe, across parameters and periods
    pub fn for_recipe(&self, recipe_id: &EntityId) -> Vec<SpcData> {
        let snapshots = self.snapshots.lock().expect("spc store poisoned");
        snapshots
            .values()
            .filter(|s| &s.recipe_id == recipe_id)
            .cloned()
            .collect()
    }

    /// Number of stored snapshots
    pub fn len(&self) -> usize {
        self.snapshots.lock().expect("spc store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;
    use crate::spc;

    fn snapshot(recipe: &EntityId, series: &[f64]) -> SpcData {
        let end = Utc::now();
        let start = end - chrono::Duration::days(30);
        spc::compute(recipe.clone(), "compressive_strength", series, 25.0, start, end).unwrap()
    }

    #[test]
    fn test_upsert_replaces_prior_snapshot() {
        let store = SpcStore::new();
        let recipe = EntityId::new(EntityPrefix::Rcp);

        let first = snapshot(&recipe, &[28.0, 29.5, 30.2]);
        let key = SpcKey::of(&first);
        let period_start = first.period_start;

        assert!(store.upsert(first).is_none());
        assert_eq!(store.len(), 1);

        // same key, recomputed with one more measurement
        let mut second = snapshot(&recipe, &[28.0, 29.5, 30.2, 31.0]);
        second.period_start = period_start;

        let replaced = store.upsert(second).expect("prior snapshot replaced");
        assert_eq!(replaced.sample_count, 3);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key).unwrap().sample_count, 4);
    }

    #[test]
    fn test_distinct_parameters_coexist() {
        let store = SpcStore::new();
        let recipe = EntityId::new(EntityPrefix::Rcp);

        let mut a = snapshot(&recipe, &[28.0, 29.5, 30.2]);
        a.parameter = "compressive_strength".to_string();
        let mut b = a.clone();
        b.parameter = "flexural_strength".to_string();

        store.upsert(a);
        store.upsert(b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.for_recipe(&recipe).len(), 2);
    }

    #[test]
    fn test_for_recipe_filters() {
        let store = SpcStore::new();
        let recipe_a = EntityId::new(EntityPrefix::Rcp);
        let recipe_b = EntityId::new(EntityPrefix::Rcp);

        store.upsert(snapshot(&recipe_a, &[28.0, 29.5, 30.2]));
        store.upsert(snapshot(&recipe_b, &[30.0, 31.0, 32.0]));

        assert_eq!(store.for_recipe(&recipe_a).len(), 1);
        assert_eq!(store.for_recipe(&recipe_b).len(), 1);
    }
}
