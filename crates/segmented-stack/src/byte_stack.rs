use std::fmt::{Debug, Formatter};

use crate::chain::Chain;
use crate::depth::SearchDepth;
use crate::error::StackError;

/// A stack of fixed-size byte blocks whose size is chosen at runtime.
///
/// This is the type-erased counterpart of [SegmentedStack](crate::SegmentedStack) and shares its
/// segment layout and growth policy. Every block pushed or popped must be exactly
/// `element_size` bytes long. Segments store the blocks back to back, a segment of capacity `c`
/// occupies `c * element_size` bytes.
///
/// # Examples
///
/// ```rust
/// # use std::error::Error;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use segmented_stack::ByteStack;
///
/// let mut stack = ByteStack::new(2, 4)?;
/// for value in [1_u32, 2, 3] {
///     stack.push(&value.to_le_bytes())?;
/// }
/// assert!(stack.item_exists(&1_u32.to_le_bytes(), -1_isize, |a, b| a == b));
///
/// let mut dest = [0; 4];
/// stack.pop(&mut dest)?;
/// assert_eq!(u32::from_le_bytes(dest), 3);
/// # Ok(())
/// # }
/// ```
pub struct ByteStack {
    chain: Chain<u8>,
    element_size: usize,
}

impl ByteStack {
    /// Creates an empty stack of `element_size`-byte blocks whose first segment holds
    /// `initial_capacity` blocks.
    ///
    /// # Errors
    ///
    /// Returns [StackError::ZeroCapacity] or [StackError::ZeroElementSize] if the respective
    /// argument is zero, [StackError::CapacityOverflow] if the first segment's byte size does not
    /// fit into `usize`, and [StackError::Allocation] if it cannot be allocated.
    pub fn new(initial_capacity: usize, element_size: usize) -> Result<Self, StackError> {
        if element_size == 0 {
            return Err(StackError::ZeroElementSize);
        }
        let chain = Chain::new(initial_capacity, element_size)?;
        Ok(Self { chain, element_size })
    }

    /// Returns the size of a block in bytes.
    #[inline(always)]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Returns `true` if the stack contains no blocks.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Returns the number of blocks on the stack.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Returns the number of allocated segments, including a drained segment that has not been
    /// released yet.
    #[inline(always)]
    pub fn segment_count(&self) -> usize {
        self.chain.segment_count()
    }

    /// Returns the number of blocks all allocated segments can hold.
    pub fn capacity(&self) -> usize {
        self.chain.capacity()
    }

    /// Returns the capacity difference between consecutive segments, in blocks.
    #[inline(always)]
    pub fn growth_increment(&self) -> usize {
        self.chain.growth_increment()
    }

    /// Copies `item` on top of the stack.
    ///
    /// # Errors
    ///
    /// Returns [StackError::ElementSize] if `item` is not `element_size` bytes long. Growth
    /// errors are the same as for [SegmentedStack::push](crate::SegmentedStack::push). The stack
    /// is unchanged on error.
    pub fn push(&mut self, item: &[u8]) -> Result<(), StackError> {
        self.check_size(item.len())?;
        self.chain.push_with(|bytes| bytes.extend_from_slice(item))
    }

    /// Copies the top block into `dest` and removes it.
    ///
    /// # Errors
    ///
    /// Returns [StackError::ElementSize] if `dest` is not `element_size` bytes long and
    /// [StackError::Empty] if the stack is empty. The stack is unchanged on error.
    pub fn pop(&mut self, dest: &mut [u8]) -> Result<(), StackError> {
        self.check_size(dest.len())?;
        let element_size = self.element_size;
        self.chain.pop_with(|bytes| {
            let start = bytes.len() - element_size;
            dest.copy_from_slice(&bytes[start..]);
            bytes.truncate(start);
        })
    }

    /// Returns the top block, or `None` if the stack is empty.
    pub fn peek(&self) -> Option<&[u8]> {
        self.chain.elements().next()
    }

    /// Searches the stack from the top for a block `equal` to `item`, examining at most
    /// `max_depth` blocks. See [SegmentedStack::item_exists](crate::SegmentedStack::item_exists).
    pub fn item_exists<F>(&self, item: &[u8], max_depth: impl Into<SearchDepth>, mut equal: F) -> bool
    where
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        self.chain.elements().take(max_depth.into().budget()).any(|candidate| equal(item, candidate))
    }

    fn check_size(&self, actual: usize) -> Result<(), StackError> {
        if actual != self.element_size {
            return Err(StackError::ElementSize { expected: self.element_size, actual });
        }
        Ok(())
    }
}

impl Debug for ByteStack {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStack")
            .field("element_size", &self.element_size)
            .field("len", &self.len())
            .field("segments", &self.segment_count())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
