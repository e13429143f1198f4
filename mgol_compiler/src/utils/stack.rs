//! Capacity-bounded LIFO used for the parser's state stack

use crate::logging::codes::{self, Code};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    #[error("Stack capacity of {capacity} exceeded")]
    Overflow { capacity: usize },

    #[error("Pop from empty stack")]
    Empty,
}

impl StackError {
    pub fn error_code(&self) -> Code {
        match self {
            StackError::Overflow { .. } => codes::syntax::STACK_OVERFLOW,
            StackError::Empty => codes::syntax::STACK_UNDERFLOW,
        }
    }
}

/// A LIFO that refuses to grow past `capacity`; cloning takes a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedStack<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> BoundedStack<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) -> Result<(), StackError> {
        if self.items.len() >= self.capacity {
            return Err(StackError::Overflow {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<T, StackError> {
        self.items.pop().ok_or(StackError::Empty)
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Pop `count` items, failing without side effects if fewer are present
    pub fn pop_many(&mut self, count: usize) -> Result<Vec<T>, StackError> {
        if count > self.items.len() {
            return Err(StackError::Empty);
        }
        let split_at = self.items.len() - count;
        Ok(self.items.split_off(split_at))
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items from bottom to top
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}
