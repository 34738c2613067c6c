//! Active-order set with O(1) swap-remove
//!
//! A dense arena of order ids plus a reverse map from id to its current
//! position. Removal overwrites the removed slot with the final element
//! and truncates, so both insert and remove are O(1) at the cost of
//! enumeration-order stability. Consumers treat the active set as
//! unordered.

use std::collections::HashMap;
use types::ids::OrderId;

/// Set of currently active order ids.
#[derive(Debug, Clone, Default)]
pub struct ActiveOrderIndex {
    ids: Vec<OrderId>,
    positions: HashMap<OrderId, usize>,
}

impl ActiveOrderIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id. Returns `false` if it was already present.
    pub fn insert(&mut self, id: OrderId) -> bool {
        if self.positions.contains_key(&id) {
            return false;
        }
        self.positions.insert(id, self.ids.len());
        self.ids.push(id);
        true
    }

    /// Remove an id by swap-remove. Returns `false` if it was absent.
    ///
    /// The last element takes over the vacated position; its recorded
    /// position is updated accordingly.
    pub fn remove(&mut self, id: OrderId) -> bool {
        let Some(position) = self.positions.remove(&id) else {
            return false;
        };
        let last = self.ids.len() - 1;
        self.ids.swap_remove(position);
        if position < last {
            let moved = self.ids[position];
            self.positions.insert(moved, position);
        }
        true
    }

    /// Check membership.
    pub fn contains(&self, id: OrderId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Recorded position of an id, if present.
    pub fn position(&self, id: OrderId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Number of active ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Snapshot of the active ids (unstable order).
    pub fn ids(&self) -> &[OrderId] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_insert_and_contains() {
        let mut index = ActiveOrderIndex::new();
        assert!(index.insert(OrderId::new(1)));
        assert!(index.insert(OrderId::new(2)));
        assert!(index.contains(OrderId::new(1)));
        assert!(!index.contains(OrderId::new(3)));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut index = ActiveOrderIndex::new();
        assert!(index.insert(OrderId::new(1)));
        assert!(!index.insert(OrderId::new(1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_absent() {
        let mut index = ActiveOrderIndex::new();
        assert!(!index.remove(OrderId::new(9)));
    }

    #[test]
    fn test_remove_last_element() {
        let mut index = ActiveOrderIndex::new();
        index.insert(OrderId::new(1));
        index.insert(OrderId::new(2));
        assert!(index.remove(OrderId::new(2)));
        assert_eq!(index.ids(), &[OrderId::new(1)]);
        assert_eq!(index.position(OrderId::new(1)), Some(0));
    }

    #[test]
    fn test_swap_remove_relocates_final_element() {
        let mut index = ActiveOrderIndex::new();
        index.insert(OrderId::new(1));
        index.insert(OrderId::new(2));
        index.insert(OrderId::new(3));

        // Removing the head moves id 3 into position 0
        assert!(index.remove(OrderId::new(1)));
        assert_eq!(index.position(OrderId::new(3)), Some(0));
        assert_eq!(index.ids(), &[OrderId::new(3), OrderId::new(2)]);
        assert!(index.contains(OrderId::new(2)));
        assert!(index.contains(OrderId::new(3)));
        assert!(!index.contains(OrderId::new(1)));
    }

    #[test]
    fn test_reinsert_after_remove() {
        let mut index = ActiveOrderIndex::new();
        index.insert(OrderId::new(1));
        index.remove(OrderId::new(1));
        assert!(index.insert(OrderId::new(1)));
        assert_eq!(index.position(OrderId::new(1)), Some(0));
    }

    #[test]
    fn test_drain_to_empty() {
        let mut index = ActiveOrderIndex::new();
        for raw in 1..=5 {
            index.insert(OrderId::new(raw));
        }
        for raw in 1..=5 {
            assert!(index.remove(OrderId::new(raw)));
        }
        assert!(index.is_empty());
        assert_eq!(index.ids(), &[] as &[OrderId]);
    }

    /// Positions must always point at the id that recorded them.
    fn check_invariant(index: &ActiveOrderIndex) {
        assert_eq!(index.ids().len(), index.len());
        for (position, id) in index.ids().iter().enumerate() {
            assert_eq!(index.position(*id), Some(position));
        }
    }

    proptest! {
        #[test]
        fn prop_index_matches_set_model(ops in proptest::collection::vec((any::<bool>(), 0u64..32), 0..200)) {
            let mut index = ActiveOrderIndex::new();
            let mut model: HashSet<OrderId> = HashSet::new();

            for (is_insert, raw) in ops {
                let id = OrderId::new(raw);
                if is_insert {
                    prop_assert_eq!(index.insert(id), model.insert(id));
                } else {
                    prop_assert_eq!(index.remove(id), model.remove(&id));
                }
                check_invariant(&index);
            }

            let ids: HashSet<OrderId> = index.ids().iter().copied().collect();
            prop_assert_eq!(ids, model);
        }
    }
}
