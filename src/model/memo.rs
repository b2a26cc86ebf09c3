//! Compute-once cache cells.
//!
//! A [`Memo`] never holds its lock while the value is being computed, so a
//! computation may freely recurse into other handles (or, for cycle checks,
//! back into the same one) without deadlocking. A failed computation leaves
//! the cell empty.

use std::sync::Mutex;

use crate::utils::sync::lock;
use crate::utils::Result;

#[derive(Debug)]
pub struct Memo<T> {
    cell: Mutex<Option<T>>,
}

impl<T: Clone> Memo<T> {
    pub const fn new() -> Self {
        Self {
            cell: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<T> {
        lock(&self.cell).clone()
    }

    /// Store `value` unless another computation got there first; returns the
    /// value that is now cached.
    pub fn set(&self, value: T) -> T {
        lock(&self.cell).get_or_insert(value).clone()
    }

    pub fn clear(&self) {
        *lock(&self.cell) = None;
    }

    #[cfg(test)]
    pub fn is_cached(&self) -> bool {
        lock(&self.cell).is_some()
    }

    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> T {
        match self.get() {
            Some(value) => value,
            None => self.set(compute()),
        }
    }

    pub fn get_or_try_compute(&self, compute: impl FnOnce() -> Result<T>) -> Result<T> {
        match self.get() {
            Some(value) => Ok(value),
            None => Ok(self.set(compute()?)),
        }
    }
}

impl<T: Clone> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Error;

    #[test]
    fn test_computes_once() {
        let memo = Memo::new();
        let mut calls = 0;
        assert_eq!(memo.get_or_compute(|| { calls += 1; 7 }), 7);
        assert_eq!(memo.get_or_compute(|| { calls += 1; 8 }), 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let memo: Memo<u32> = Memo::new();
        let failed = memo.get_or_try_compute(|| Err(Error::Model("boom".into())));
        assert!(failed.is_err());
        assert!(!memo.is_cached());
        assert_eq!(memo.get_or_try_compute(|| Ok(3)).unwrap(), 3);
        memo.clear();
        assert_eq!(memo.get(), None);
    }
}
