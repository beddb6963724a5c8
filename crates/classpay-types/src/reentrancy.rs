//! Per-class reentrancy guard.
//!
//! A store marks a class as in flight when an operation that calls out to a
//! collaborator begins and clears it when the operation returns. A nested
//! call for the same class while it is in flight returns
//! [`ClasspayError::ReentrantCall`].

use std::collections::HashSet;

use crate::{ClassId, ClasspayError, Result};

/// Tracks which classes have an operation in flight within one store.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    in_flight: HashSet<ClassId>,
}

impl ReentrancyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `class_id` as in flight.
    ///
    /// # Errors
    /// Returns [`ClasspayError::ReentrantCall`] if it already is.
    pub fn enter(&mut self, class_id: ClassId) -> Result<()> {
        if !self.in_flight.insert(class_id) {
            tracing::warn!(class_id = %class_id, "Reentrant call rejected");
            return Err(ClasspayError::ReentrantCall(class_id));
        }
        Ok(())
    }

    /// Clear the in-flight mark for `class_id`.
    pub fn exit(&mut self, class_id: ClassId) {
        self.in_flight.remove(&class_id);
    }

    #[must_use]
    pub fn is_in_flight(&self, class_id: ClassId) -> bool {
        self.in_flight.contains(&class_id)
    }

    /// Whether no class is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_entry_ok() {
        let mut guard = ReentrancyGuard::new();
        assert!(guard.enter(ClassId(1)).is_ok());
        assert!(guard.is_in_flight(ClassId(1)));
    }

    #[test]
    fn nested_entry_blocked() {
        let mut guard = ReentrancyGuard::new();
        guard.enter(ClassId(1)).unwrap();
        let err = guard.enter(ClassId(1)).unwrap_err();
        assert_eq!(err, ClasspayError::ReentrantCall(ClassId(1)));
    }

    #[test]
    fn other_classes_unaffected() {
        let mut guard = ReentrancyGuard::new();
        guard.enter(ClassId(1)).unwrap();
        assert!(guard.enter(ClassId(2)).is_ok());
    }

    #[test]
    fn exit_allows_reentry() {
        let mut guard = ReentrancyGuard::new();
        guard.enter(ClassId(1)).unwrap();
        guard.exit(ClassId(1));
        assert!(guard.is_idle());
        assert!(guard.enter(ClassId(1)).is_ok());
    }
}
