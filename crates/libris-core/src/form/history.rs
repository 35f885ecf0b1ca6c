//! Undo/redo snapshot stacks

/// Bounded undo/redo history of snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    undo: Vec<T>,
    redo: Vec<T>,
    limit: usize,
}

impl<T> History<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Remember the state before a new change; clears the redo stack
    pub fn record(&mut self, previous: T) {
        if self.undo.len() == self.limit {
            self.undo.remove(0);
        }
        self.undo.push(previous);
        self.redo.clear();
    }

    /// Step back; `current` moves onto the redo stack
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward; `current` moves onto the undo stack
    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo() {
        let mut h = History::new(10);
        h.record(1);
        h.record(2);
        assert_eq!(h.undo(3), Some(2));
        assert_eq!(h.undo(2), Some(1));
        assert_eq!(h.undo(1), None);
        assert_eq!(h.redo(1), Some(2));
        assert_eq!(h.redo(2), Some(3));
        assert!(!h.can_redo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut h = History::new(10);
        h.record("a");
        h.undo("b");
        assert!(h.can_redo());
        h.record("a");
        assert!(!h.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut h = History::new(2);
        h.record(1);
        h.record(2);
        h.record(3);
        assert_eq!(h.undo(4), Some(3));
        assert_eq!(h.undo(3), Some(2));
        assert_eq!(h.undo(2), None);
    }
}
