use std::alloc::Layout;

use tracing::{debug, trace};

use crate::error::StackError;

/// A fixed-capacity block of the stack.
///
/// The buffer is reserved once with the final capacity and never grows past it, so elements
/// stored in a segment keep their address until they are removed.
pub(crate) struct Segment<T> {
    items: Vec<T>,
    capacity: usize,
    next: Option<Box<Segment<T>>>,
}

impl<T> Segment<T> {
    fn allocate(capacity: usize) -> Result<Box<Self>, StackError> {
        // The buffer's byte size must fit into `isize`.
        Layout::array::<T>(capacity).map_err(|_| StackError::CapacityOverflow)?;
        let mut items = Vec::new();
        items.try_reserve_exact(capacity)?;
        Ok(Box::new(Self { items, capacity, next: None }))
    }

    #[inline(always)]
    pub(crate) fn items(&self) -> &[T] {
        &self.items
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }
}

/// The segment chain shared by the typed and the byte stack.
///
/// Capacities are counted in buffer units. An element occupies `stride` consecutive units, so
/// every segment holds a whole number of elements. The head is the newest segment. Every other
/// segment is full.
pub(crate) struct Chain<T> {
    head: Box<Segment<T>>,
    increment: usize,
    stride: usize,
    len: usize,
    segments: usize,
}

impl<T> Chain<T> {
    /// Creates a chain with a single segment of `capacity` elements of `stride` units each.
    pub(crate) fn new(capacity: usize, stride: usize) -> Result<Self, StackError> {
        debug_assert!(stride > 0);
        if capacity == 0 {
            return Err(StackError::ZeroCapacity);
        }
        let increment = capacity.checked_mul(stride).ok_or(StackError::CapacityOverflow)?;
        let head = Segment::allocate(increment)?;
        trace!(capacity, stride, "created segment chain");
        Ok(Self { head, increment, stride, len: 0, segments: 1 })
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.head.items.is_empty() && self.head.next.is_none()
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub(crate) fn segment_count(&self) -> usize {
        self.segments
    }

    /// The growth increment in elements.
    #[inline(always)]
    pub(crate) fn growth_increment(&self) -> usize {
        self.increment / self.stride
    }

    /// The total capacity of all live segments in elements.
    pub(crate) fn capacity(&self) -> usize {
        self.segments().map(Segment::capacity).sum::<usize>() / self.stride
    }

    /// Iterates over the live segments from the head to the bottom segment.
    pub(crate) fn segments(&self) -> impl Iterator<Item = &Segment<T>> + '_ {
        std::iter::successors(Some(&*self.head), |segment| segment.next.as_deref())
    }

    /// Iterates over the elements from the top to the bottom of the stack, each as a slice of
    /// `stride` units.
    pub(crate) fn elements(&self) -> impl Iterator<Item = &[T]> + '_ {
        let stride = self.stride;
        self.segments().flat_map(move |segment| segment.items.chunks_exact(stride).rev())
    }

    /// Appends one element to the head segment, allocating a new head first if the current one
    /// is full.
    ///
    /// `write` must append exactly `stride` units.
    pub(crate) fn push_with(&mut self, write: impl FnOnce(&mut Vec<T>)) -> Result<(), StackError> {
        if self.head.is_full() {
            self.grow()?;
        }
        write(&mut self.head.items);
        debug_assert!(self.head.items.len() <= self.head.capacity);
        self.len += 1;
        Ok(())
    }

    /// Removes the top element. A drained head segment is released here, when a pop has to read
    /// from the segment below it.
    ///
    /// `take` receives a buffer holding at least one element and must remove exactly `stride`
    /// units from its end.
    pub(crate) fn pop_with<R>(&mut self, take: impl FnOnce(&mut Vec<T>) -> R) -> Result<R, StackError> {
        if self.is_empty() {
            return Err(StackError::Empty);
        }
        if self.head.items.is_empty() {
            self.release_head();
        }
        let value = take(&mut self.head.items);
        self.len -= 1;
        Ok(value)
    }

    fn grow(&mut self) -> Result<(), StackError> {
        let capacity = self.head.capacity().checked_add(self.increment).ok_or(StackError::CapacityOverflow)?;
        let segment = Segment::allocate(capacity)?;
        let older = std::mem::replace(&mut self.head, segment);
        self.head.next = Some(older);
        self.segments += 1;
        debug!(capacity = capacity / self.stride, segments = self.segments, "allocated segment");
        Ok(())
    }

    fn release_head(&mut self) {
        let Some(next) = self.head.next.take() else {
            return;
        };
        let drained = std::mem::replace(&mut self.head, next);
        self.segments -= 1;
        debug_assert!(self.head.is_full());
        debug!(capacity = drained.capacity() / self.stride, segments = self.segments, "released segment");
    }
}

impl<T> Drop for Chain<T> {
    fn drop(&mut self) {
        // Unlink iteratively so that dropping a long chain does not recurse once per segment.
        let mut next = self.head.next.take();
        while let Some(mut segment) = next {
            next = segment.next.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::chain::Chain;
    use crate::error::StackError;

    fn capacities<T>(chain: &Chain<T>) -> Vec<usize> {
        chain.segments().map(|segment| segment.capacity()).collect()
    }

    #[test]
    fn zero_capacity() {
        assert_eq!(Chain::<u8>::new(0, 1).err(), Some(StackError::ZeroCapacity));
    }

    #[test]
    fn unit_capacity_overflow() {
        assert_eq!(Chain::<u8>::new(usize::MAX, 2).err(), Some(StackError::CapacityOverflow));
    }

    #[test]
    fn arithmetic_growth() {
        let mut chain = Chain::new(3, 1).unwrap();
        for i in 0..18 {
            chain.push_with(|items| items.push(i)).unwrap();
        }
        assert_eq!(capacities(&chain), [9, 6, 3]);
        assert_eq!(chain.segment_count(), 3);
        assert_eq!(chain.capacity(), 18);
        assert_eq!(chain.len(), 18);
        assert_eq!(chain.growth_increment(), 3);

        chain.push_with(|items| items.push(18)).unwrap();
        assert_eq!(capacities(&chain), [12, 9, 6, 3]);
    }

    #[test]
    fn stride_keeps_elements_together() {
        let mut chain = Chain::new(2, 3).unwrap();
        for i in 0..5_u8 {
            chain.push_with(|items| items.extend_from_slice(&[i, i, i])).unwrap();
        }
        assert_eq!(capacities(&chain), [12, 6]);
        assert_eq!(chain.capacity(), 6);
        assert_eq!(chain.growth_increment(), 2);
        let elements: Vec<_> = chain.elements().collect();
        assert_eq!(elements, [[4, 4, 4], [3, 3, 3], [2, 2, 2], [1, 1, 1], [0, 0, 0]]);
    }

    #[test]
    fn release_is_lazy() {
        let mut chain = Chain::new(2, 1).unwrap();
        for i in 0..3 {
            chain.push_with(|items| items.push(i)).unwrap();
        }
        assert_eq!(chain.segment_count(), 2);

        assert_eq!(chain.pop_with(Vec::pop), Ok(Some(2)));
        assert_eq!(chain.segment_count(), 2);
        assert!(!chain.is_empty());

        assert_eq!(chain.pop_with(Vec::pop), Ok(Some(1)));
        assert_eq!(chain.segment_count(), 1);

        assert_eq!(chain.pop_with(Vec::pop), Ok(Some(0)));
        assert!(chain.is_empty());
        assert_eq!(chain.pop_with(Vec::pop), Err(StackError::Empty));
        assert_eq!(chain.segment_count(), 1);
        assert_eq!(chain.len(), 0);
    }

    #[test]
    fn growth_overflow_leaves_chain_unchanged() {
        let mut chain = Chain::<()>::new(1, 1).unwrap();
        chain.push_with(|items| items.push(())).unwrap();
        chain.increment = usize::MAX;

        assert_eq!(chain.push_with(|items| items.push(())), Err(StackError::CapacityOverflow));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.segment_count(), 1);
        assert_eq!(capacities(&chain), [1]);
    }

    #[test]
    fn byte_size_overflow_leaves_chain_unchanged() {
        let mut chain = Chain::<u64>::new(1, 1).unwrap();
        chain.push_with(|items| items.push(7)).unwrap();
        // The next segment would need more than `isize::MAX` bytes.
        chain.increment = usize::MAX / 8;

        assert_eq!(chain.push_with(|items| items.push(8)), Err(StackError::CapacityOverflow));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.segment_count(), 1);
        assert_eq!(capacities(&chain), [1]);
        assert_eq!(chain.pop_with(Vec::pop), Ok(Some(7)));
    }

    #[test]
    fn failed_allocation_leaves_chain_unchanged() {
        let mut chain = Chain::<u64>::new(1, 1).unwrap();
        chain.push_with(|items| items.push(7)).unwrap();
        // A valid layout, but far beyond any address space.
        chain.increment = isize::MAX as usize / 16;

        assert!(matches!(chain.push_with(|items| items.push(8)), Err(StackError::Allocation(_))));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.segment_count(), 1);
        assert_eq!(chain.pop_with(Vec::pop), Ok(Some(7)));
    }

    #[test]
    fn drop_long_chain() {
        let mut chain = Chain::new(1, 1).unwrap();
        for i in 0..100_000_u32 {
            chain.push_with(|items| items.push(i)).unwrap();
        }
        assert!(chain.segment_count() > 400);
        drop(chain);
    }
}
