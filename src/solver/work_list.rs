use std::collections::{HashSet, VecDeque};

use crate::solver::engine::{CellId, ConstraintId};
use crate::solver::graph::InequalityEdge;

/// FIFO queue of pending arc revisions, deduplicated so a (cell, constraint)
/// pair is never queued twice at once. FIFO order keeps the emitted
/// propagation steps deterministic.
pub struct WorkList {
    queue: VecDeque<(CellId, InequalityEdge)>,
    queue_members: HashSet<(CellId, ConstraintId)>,
}

impl WorkList {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            queue_members: HashSet::new(),
        }
    }

    pub fn push_back(&mut self, target: CellId, edge: InequalityEdge) {
        if self.queue_members.insert((target, edge.constraint)) {
            self.queue.push_back((target, edge));
        }
    }

    pub fn pop_front(&mut self) -> Option<(CellId, InequalityEdge)> {
        let (target, edge) = self.queue.pop_front()?;
        self.queue_members.remove(&(target, edge.constraint));
        Some((target, edge))
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for WorkList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::puzzle::Relation;

    fn edge(neighbor: CellId, constraint: ConstraintId) -> InequalityEdge {
        InequalityEdge {
            neighbor,
            relation: Relation::Greater,
            constraint,
        }
    }

    #[test]
    fn pops_in_insertion_order() {
        let mut list = WorkList::new();
        list.push_back(0, edge(1, 0));
        list.push_back(2, edge(3, 1));
        assert_eq!(list.pop_front().map(|(t, _)| t), Some(0));
        assert_eq!(list.pop_front().map(|(t, _)| t), Some(2));
        assert_eq!(list.pop_front(), None);
    }

    #[test]
    fn deduplicates_pending_arcs() {
        let mut list = WorkList::new();
        list.push_back(0, edge(1, 0));
        list.push_back(0, edge(1, 0));
        assert_eq!(list.pop_front().map(|(t, _)| t), Some(0));
        assert!(list.is_empty());
        // Once popped, the arc may be queued again.
        list.push_back(0, edge(1, 0));
        assert!(!list.is_empty());
    }
}
