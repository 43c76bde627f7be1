//! Counts distinct acceptor ids voting for a ballot, structured after
//! `quorum.h`'s acceptor-id array, using a `HashSet` in place of a fixed
//! `acceptor_ids[N_OF_ACCEPTORS]` array since nothing requires the
//! ordered, fixed-size representation.

use std::collections::HashSet;

use crate::types::AcceptorId;

#[derive(Debug, Clone)]
pub struct Quorum {
    required: usize,
    ids: HashSet<AcceptorId>,
}

impl Quorum {
    pub fn new(required: usize) -> Self {
        Quorum {
            required,
            ids: HashSet::new(),
        }
    }

    /// Resets this tracker to empty, keeping the required count. Used by
    /// the proposer when re-preparing an instance at a higher ballot.
    pub fn reset(&mut self) {
        self.ids.clear();
    }

    /// Records a vote from `id`. Returns `false` if `id` had already
    /// voted (the duplicate is dropped by the caller).
    pub fn add(&mut self, id: AcceptorId) -> bool {
        self.ids.insert(id)
    }

    pub fn reached(&self) -> bool {
        self.ids.len() >= self.required
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_majority() {
        let mut q = Quorum::new(2);
        assert!(!q.reached());
        assert!(q.add(0));
        assert!(!q.reached());
        assert!(q.add(1));
        assert!(q.reached());
    }

    #[test]
    fn add_is_idempotent() {
        let mut q = Quorum::new(2);
        assert!(q.add(0));
        assert!(!q.add(0));
        assert_eq!(q.count(), 1);
        assert!(!q.reached());
    }

    #[test]
    fn reset_clears_votes() {
        let mut q = Quorum::new(1);
        q.add(0);
        assert!(q.reached());
        q.reset();
        assert!(!q.reached());
    }
}
