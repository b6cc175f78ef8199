use std::fmt::{Debug, Formatter};

use crate::chain::Chain;
use crate::depth::SearchDepth;
use crate::error::StackError;

/// A LIFO stack stored in a chain of segments.
///
/// The first segment holds `initial_capacity` elements. When the newest segment is full, a new
/// one with `initial_capacity` more slots than the previous newest segment is allocated, so the
/// k-th segment (counted from 0 at the bottom) holds `initial_capacity * (k + 1)` elements.
/// Growth is arithmetic rather than geometric: `n` pushes allocate about `sqrt(2n /
/// initial_capacity)` segments.
///
/// Existing elements are never moved when the stack grows. A segment emptied by pops stays
/// allocated until the next pop has to read from the segment below it, so alternating pushes and
/// pops at a segment boundary do not allocate repeatedly. The bottom segment lives as long as the
/// stack.
///
/// # Examples
///
/// ```rust
/// # use std::error::Error;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use segmented_stack::{SearchDepth, SegmentedStack};
///
/// let mut stack = SegmentedStack::with_capacity(2)?;
/// for value in [1, 2, 3] {
///     stack.push(value)?;
/// }
/// assert_eq!(stack.segment_count(), 2);
///
/// assert!(stack.item_exists(&2, SearchDepth::Limited(2), |a, b| a == b));
/// assert!(!stack.item_exists(&1, SearchDepth::Limited(2), |a, b| a == b));
///
/// assert_eq!(stack.pop()?, 3);
/// assert_eq!(stack.pop()?, 2);
/// assert_eq!(stack.pop()?, 1);
/// assert!(stack.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct SegmentedStack<T> {
    chain: Chain<T>,
}

impl<T> SegmentedStack<T> {
    /// Creates an empty stack whose first segment holds `initial_capacity` elements.
    /// `initial_capacity` is also the growth increment of every further segment.
    ///
    /// # Errors
    ///
    /// Returns [StackError::ZeroCapacity] if `initial_capacity` is zero,
    /// [StackError::CapacityOverflow] if the first segment's byte size exceeds `isize::MAX`, and
    /// [StackError::Allocation] if it cannot be allocated.
    pub fn with_capacity(initial_capacity: usize) -> Result<Self, StackError> {
        Ok(Self { chain: Chain::new(initial_capacity, 1)? })
    }

    /// Returns `true` if the stack contains no elements.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Returns the number of elements on the stack.
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

    /// Returns the number of elements all allocated segments can hold.
    pub fn capacity(&self) -> usize {
        self.chain.capacity()
    }

    /// Returns the capacity difference between consecutive segments.
    #[inline(always)]
    pub fn growth_increment(&self) -> usize {
        self.chain.growth_increment()
    }

    /// Pushes an element on top of the stack.
    ///
    /// # Errors
    ///
    /// If a new segment is needed and its capacity overflows `usize` or its allocation fails,
    /// the element is dropped and the stack is left unchanged.
    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        self.chain.push_with(|items| items.push(value))
    }

    /// Removes the top element and returns it.
    ///
    /// # Errors
    ///
    /// Returns [StackError::Empty] if the stack is empty. Check [SegmentedStack::is_empty] first.
    pub fn pop(&mut self) -> Result<T, StackError> {
        self.chain.pop_with(Vec::pop)?.ok_or(StackError::Empty)
    }

    /// Returns a reference to the top element, or `None` if the stack is empty.
    pub fn peek(&self) -> Option<&T> {
        self.top_down().next()
    }

    /// Searches the stack from the top for an element `equal` to `item`, examining at most
    /// `max_depth` elements.
    ///
    /// `equal` is called as `equal(item, candidate)`. `max_depth` accepts a [SearchDepth], a
    /// `usize` limit, or a signed integer where any negative value means no limit.
    pub fn item_exists<F>(&self, item: &T, max_depth: impl Into<SearchDepth>, mut equal: F) -> bool
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.top_down().take(max_depth.into().budget()).any(|candidate| equal(item, candidate))
    }

    /// Returns `true` if the stack contains `item`.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.item_exists(item, SearchDepth::Unlimited, T::eq)
    }

    fn top_down(&self) -> impl Iterator<Item = &T> + '_ {
        self.chain.segments().flat_map(|segment| segment.items().iter().rev())
    }
}

struct TopDown<'a, T>(&'a SegmentedStack<T>);

impl<T: Debug> Debug for TopDown<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.top_down()).finish()
    }
}

impl<T: Debug> Debug for SegmentedStack<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentedStack")
            .field("len", &self.len())
            .field("segments", &self.segment_count())
            .field("capacity", &self.capacity())
            .field("elements", &TopDown(self))
            .finish()
    }
}
