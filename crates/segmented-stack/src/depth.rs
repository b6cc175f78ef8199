/// The number of elements a search may examine, counted from the top of the stack.
///
/// Signed integers convert the way a C-style `max_depth` argument is read: any negative value
/// means [SearchDepth::Unlimited], everything else is a limit.
///
/// ```rust
/// use segmented_stack::SearchDepth;
///
/// assert_eq!(SearchDepth::from(-1_isize), SearchDepth::Unlimited);
/// assert_eq!(SearchDepth::from(3_isize), SearchDepth::Limited(3));
/// assert_eq!(SearchDepth::from(None), SearchDepth::Unlimited);
/// ```
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub enum SearchDepth {
    /// Examine at most this many elements.
    Limited(usize),
    /// Examine the whole stack.
    #[default]
    Unlimited,
}

impl SearchDepth {
    /// Returns the limit, or `None` for an unlimited search.
    #[inline(always)]
    pub fn limit(self) -> Option<usize> {
        match self {
            SearchDepth::Limited(limit) => Some(limit),
            SearchDepth::Unlimited => None,
        }
    }

    /// The number of candidates to take from an iterator. A stack never holds more than
    /// `usize::MAX` elements, so `usize::MAX` stands in for no limit.
    #[inline(always)]
    pub(crate) fn budget(self) -> usize {
        self.limit().unwrap_or(usize::MAX)
    }
}

impl From<usize> for SearchDepth {
    fn from(limit: usize) -> Self {
        SearchDepth::Limited(limit)
    }
}

impl From<Option<usize>> for SearchDepth {
    fn from(limit: Option<usize>) -> Self {
        limit.map_or(SearchDepth::Unlimited, SearchDepth::Limited)
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SearchDepth {
                fn from(max_depth: $ty) -> Self {
                    // Negative values are unlimited. Positive values beyond `usize::MAX` exceed
                    // any stack and are unlimited as well.
                    usize::try_from(max_depth).map_or(SearchDepth::Unlimited, SearchDepth::Limited)
                }
            }
        )*
    };
}

impl_from_signed!(i32, i64, isize);

#[cfg(test)]
mod tests {
    use crate::SearchDepth;

    #[test]
    fn negative_is_unlimited() {
        assert_eq!(SearchDepth::from(-1_i32), SearchDepth::Unlimited);
        assert_eq!(SearchDepth::from(-42_i64), SearchDepth::Unlimited);
        assert_eq!(SearchDepth::from(isize::MIN), SearchDepth::Unlimited);
    }

    #[test]
    fn non_negative_is_limited() {
        assert_eq!(SearchDepth::from(0_i32), SearchDepth::Limited(0));
        assert_eq!(SearchDepth::from(7_i64), SearchDepth::Limited(7));
        assert_eq!(SearchDepth::from(7_usize), SearchDepth::Limited(7));
        assert_eq!(SearchDepth::from(Some(2)), SearchDepth::Limited(2));
    }

    #[test]
    fn budget() {
        assert_eq!(SearchDepth::Limited(5).budget(), 5);
        assert_eq!(SearchDepth::Unlimited.budget(), usize::MAX);
        assert_eq!(SearchDepth::default().limit(), None);
    }
}
