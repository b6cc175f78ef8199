use std::collections::TryReserveError;

use thiserror::Error;

/// Errors returned by the stack operations.
///
/// An operation that returns an error leaves the stack exactly as it was before the call.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum StackError {
    /// `pop` was called on an empty stack.
    #[error("stack is empty")]
    Empty,
    /// The initial capacity, which is also the growth increment, was zero.
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,
    /// A byte stack was created with an element size of zero.
    #[error("element size must be at least 1 byte")]
    ZeroElementSize,
    /// The capacity of the next segment does not fit into `usize`.
    #[error("segment capacity overflow")]
    CapacityOverflow,
    /// A byte block passed to a byte stack does not have the element size of the stack.
    #[error("wrong element size (expected {expected} bytes, got {actual})")]
    ElementSize {
        /// The element size of the stack.
        expected: usize,
        /// The length of the given block.
        actual: usize,
    },
    /// The buffer of a new segment could not be allocated.
    #[error("could not allocate segment")]
    Allocation(#[from] TryReserveError),
}
