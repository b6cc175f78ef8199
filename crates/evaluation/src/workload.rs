use std::error::Error;

use rand::Rng;
use segmented_stack::{ByteStack, SearchDepth, SegmentedStack, StackError};
use tracing::{debug, instrument};

/// The stack operations a workload drives, on `u64` elements.
pub(crate) trait Subject {
    fn push(&mut self, value: u64) -> Result<(), StackError>;
    fn pop(&mut self) -> Result<u64, StackError>;
    fn item_exists(&self, value: u64, depth: SearchDepth) -> bool;
    fn is_empty(&self) -> bool;
    fn segment_count(&self) -> usize;
}

impl Subject for SegmentedStack<u64> {
    fn push(&mut self, value: u64) -> Result<(), StackError> {
        SegmentedStack::push(self, value)
    }
    fn pop(&mut self) -> Result<u64, StackError> {
        SegmentedStack::pop(self)
    }
    fn item_exists(&self, value: u64, depth: SearchDepth) -> bool {
        SegmentedStack::item_exists(self, &value, depth, |a, b| a == b)
    }
    fn is_empty(&self) -> bool {
        SegmentedStack::is_empty(self)
    }
    fn segment_count(&self) -> usize {
        SegmentedStack::segment_count(self)
    }
}

impl Subject for ByteStack {
    fn push(&mut self, value: u64) -> Result<(), StackError> {
        ByteStack::push(self, &value.to_le_bytes())
    }
    fn pop(&mut self) -> Result<u64, StackError> {
        let mut dest = [0; 8];
        ByteStack::pop(self, &mut dest)?;
        Ok(u64::from_le_bytes(dest))
    }
    fn item_exists(&self, value: u64, depth: SearchDepth) -> bool {
        ByteStack::item_exists(self, &value.to_le_bytes(), depth, |a, b| a == b)
    }
    fn is_empty(&self) -> bool {
        ByteStack::is_empty(self)
    }
    fn segment_count(&self) -> usize {
        ByteStack::segment_count(self)
    }
}

/// Operation counts of a finished workload.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counts {
    pub(crate) pushes: usize,
    pub(crate) pops: usize,
    pub(crate) searches: usize,
    pub(crate) hits: usize,
    pub(crate) max_segments: usize,
}

/// Runs every operation on the stack and on a `Vec` and fails on the first disagreement.
pub(crate) struct Checked<S> {
    stack: S,
    model: Vec<u64>,
    depth: SearchDepth,
    counts: Counts,
}

impl<S: Subject> Checked<S> {
    pub(crate) fn new(stack: S, depth: SearchDepth) -> Self {
        Self { stack, model: vec![], depth, counts: Counts::default() }
    }

    fn push(&mut self, value: u64) -> Result<(), Box<dyn Error>> {
        self.stack.push(value)?;
        self.model.push(value);
        self.counts.pushes += 1;
        self.counts.max_segments = self.counts.max_segments.max(self.stack.segment_count());
        Ok(())
    }

    fn pop(&mut self) -> Result<(), Box<dyn Error>> {
        let actual = self.stack.pop().ok();
        let expected = self.model.pop();
        if actual != expected {
            return Err(format!("pop returned {actual:?}, expected {expected:?}").into());
        }
        self.counts.pops += 1;
        Ok(())
    }

    fn search(&mut self, value: u64) -> Result<(), Box<dyn Error>> {
        let actual = self.stack.item_exists(value, self.depth);
        let budget = self.depth.limit().unwrap_or(usize::MAX);
        let expected = self.model.iter().rev().take(budget).any(|v| *v == value);
        if actual != expected {
            return Err(format!("search for {value} returned {actual}, expected {expected}").into());
        }
        self.counts.searches += 1;
        self.counts.hits += usize::from(actual);
        Ok(())
    }

    /// Pops the remaining elements and checks that both stacks end up empty.
    pub(crate) fn finish(mut self) -> Result<Counts, Box<dyn Error>> {
        while !self.model.is_empty() {
            self.pop()?;
        }
        if !self.stack.is_empty() {
            return Err("stack not empty after popping every element".into());
        }
        if self.stack.segment_count() != 1 {
            return Err(format!("{} segments left on an empty stack", self.stack.segment_count()).into());
        }
        Ok(self.counts)
    }
}

/// Pushes `elements` values, searches for a sample of them, and pops them again.
#[instrument(skip_all)]
pub(crate) fn fill<S: Subject>(checked: &mut Checked<S>, elements: usize) -> Result<(), Box<dyn Error>> {
    for value in 0..elements as u64 {
        checked.push(value)?;
    }
    debug!(segments = checked.counts.max_segments);
    let step = (elements / 64).max(1);
    for value in (0..=elements as u64).step_by(step) {
        checked.search(value)?;
    }
    while !checked.model.is_empty() {
        checked.pop()?;
    }
    Ok(())
}

/// Repeatedly pushes one element more than a segment boundary needs and pops all but one of
/// them, so that the top keeps crossing segment boundaries.
#[instrument(skip_all)]
pub(crate) fn sawtooth<S: Subject>(
    checked: &mut Checked<S>,
    elements: usize,
    initial_capacity: usize,
) -> Result<(), Box<dyn Error>> {
    let width = initial_capacity + 1;
    let mut value = 0;
    while checked.counts.pushes < elements {
        for _ in 0..width {
            checked.push(value)?;
            value += 1;
        }
        checked.search(value.saturating_sub(width as u64))?;
        for _ in 1..width {
            checked.pop()?;
        }
    }
    Ok(())
}

/// Random mix of pushes, pops and searches.
#[instrument(skip_all)]
pub(crate) fn random<S: Subject>(
    checked: &mut Checked<S>,
    elements: usize,
    rng: &mut impl Rng,
) -> Result<(), Box<dyn Error>> {
    let mut next_value = 0;
    while checked.counts.pushes < elements {
        match rng.gen_range(0..10) {
            0..=5 => {
                checked.push(next_value)?;
                next_value += 1;
            }
            6..=8 => checked.pop()?,
            _ => checked.search(rng.gen_range(0..=next_value))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use segmented_stack::{ByteStack, SearchDepth, SegmentedStack};

    use crate::workload::{fill, random, sawtooth, Checked};

    #[test]
    fn fill_typed() {
        let mut checked = Checked::new(SegmentedStack::<u64>::with_capacity(4).unwrap(), SearchDepth::Unlimited);
        fill(&mut checked, 1024).unwrap();
        let counts = checked.finish().unwrap();
        assert_eq!(counts.pushes, 1024);
        assert_eq!(counts.pops, 1024);
        assert_eq!(counts.searches, 64 + 1);
        assert_eq!(counts.hits, 64);
    }

    #[test]
    fn sawtooth_bytes() {
        let mut checked = Checked::new(ByteStack::new(3, 8).unwrap(), SearchDepth::Limited(4));
        sawtooth(&mut checked, 400, 3).unwrap();
        let counts = checked.finish().unwrap();
        assert_eq!(counts.pushes, 400);
        assert_eq!(counts.searches, 100);
        assert_eq!(counts.hits, 100);
    }

    #[test]
    fn random_typed_and_bytes() {
        for depth in [SearchDepth::Unlimited, SearchDepth::Limited(10)] {
            let mut checked = Checked::new(SegmentedStack::<u64>::with_capacity(2).unwrap(), depth);
            random(&mut checked, 5000, &mut StdRng::seed_from_u64(42)).unwrap();
            checked.finish().unwrap();

            let mut checked = Checked::new(ByteStack::new(2, 8).unwrap(), depth);
            random(&mut checked, 5000, &mut StdRng::seed_from_u64(42)).unwrap();
            checked.finish().unwrap();
        }
    }
}
