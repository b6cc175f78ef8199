//! A stack stored in a chain of segments instead of a single reallocated buffer.
//!
//! The stack starts with one segment of `initial_capacity` elements. Whenever the newest segment
//! is full, a segment with `initial_capacity` more slots is allocated and linked in front of it.
//! Since a segment is never reallocated, elements keep their address for as long as they are on
//! the stack.
//!
//! Two front-ends share the same segment chain:
//! + [SegmentedStack] is generic over the element type.
//! + [ByteStack] stores byte blocks whose size is fixed when the stack is created.
//!
//! # Examples
//!
//! ```rust
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use segmented_stack::SegmentedStack;
//!
//! let mut stack = SegmentedStack::with_capacity(4)?;
//! for i in 0..10 {
//!     stack.push(i)?;
//! }
//! // 4 + 8 slots
//! assert_eq!(stack.segment_count(), 2);
//!
//! // search the 3 topmost elements, a negative depth searches everything
//! assert!(stack.item_exists(&7, 3_isize, |a, b| a == b));
//! assert!(!stack.item_exists(&6, 3_isize, |a, b| a == b));
//! assert!(stack.item_exists(&0, -1_isize, |a, b| a == b));
//!
//! let popped: Vec<_> = std::iter::from_fn(|| stack.pop().ok()).collect();
//! assert_eq!(popped, (0..10).rev().collect::<Vec<_>>());
//! assert!(stack.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Operations never abort. Allocation failure, capacity overflow and popping from an empty stack
//! are reported as [StackError], and a failed operation leaves the stack unchanged.
//!
//! # Logging
//!
//! Segment allocation and release are reported as `debug` events through [tracing].

#![forbid(unsafe_code)]
#![doc(test(attr(deny(warnings, rust_2018_idioms), allow(dead_code))))]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

mod byte_stack;
mod chain;
mod depth;
mod error;
mod stack;

pub use byte_stack::ByteStack;
pub use depth::SearchDepth;
pub use error::StackError;
pub use stack::SegmentedStack;
