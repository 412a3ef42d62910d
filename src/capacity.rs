//! Growth policies used when a vector must extend its allocation.

use core::fmt::Debug;

/// The smallest non-zero capacity requested for elements of `width` bytes.
pub const fn min_non_zero_cap(width: usize) -> usize {
    if width == 1 {
        8
    } else if width <= 1024 {
        4
    } else {
        1
    }
}

/// Growth behavior for collections which have exceeded their available storage
pub trait Grow: Debug {
    /// Calculate the next capacity (in elements of `width` bytes) to request
    /// from the allocator, given the previous capacity and the minimum required.
    fn next_capacity(width: usize, prev: usize, minimum: usize) -> usize;
}

/// Growth behavior which never requests extra capacity
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowExact;

impl Grow for GrowExact {
    #[inline]
    fn next_capacity(_width: usize, _prev: usize, minimum: usize) -> usize {
        minimum
    }
}

/// Growth behavior which consistently doubles in size
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct GrowDoubling;

impl Grow for GrowDoubling {
    #[inline]
    fn next_capacity(width: usize, prev: usize, minimum: usize) -> usize {
        let preferred = if prev == 0 {
            min_non_zero_cap(width)
        } else {
            prev.saturating_mul(2)
        };
        preferred.max(minimum)
    }
}
