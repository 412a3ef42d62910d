use core::cmp::Ordering;
use core::iter::FusedIterator;
use core::slice::ChunksExact;

use crate::alloc::Allocator;
use crate::tag::Tag;

use super::SVec;

impl<A: Allocator> SVec<A> {
    /// Access the raw bytes of the element at `index`. The sentinel and
    /// out-of-range indices produce an empty slice.
    #[inline]
    pub fn at(&self, index: usize) -> &[u8] {
        self.get(index).unwrap_or(&[])
    }

    /// Access the raw bytes of the element at `index`, if it is in range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index < self.len() {
            let width = self.width();
            Some(&self.as_bytes()[index * width..(index + 1) * width])
        } else {
            None
        }
    }

    /// Access the raw bytes of the element slot at `index` without checking
    /// the length.
    ///
    /// # Safety
    /// The vector must not be the sentinel and `index` must be less than its
    /// capacity.
    #[inline]
    pub unsafe fn at_unchecked(&self, index: usize) -> &[u8] {
        let width = self.width();
        self.buffer
            .data()
            .get_unchecked(index * width..(index + 1) * width)
    }

    /// Read the element at `index` widened to an `i64`, or zero when out of
    /// range or not an integer vector.
    #[inline]
    pub fn at_i(&self, index: usize) -> i64 {
        match (self.tag(), self.get(index)) {
            (Some(tag), Some(slot)) => tag.load_signed(slot),
            _ => 0,
        }
    }

    /// Read the element at `index` widened to a `u64`, or zero when out of
    /// range or not an integer vector.
    #[inline]
    pub fn at_u(&self, index: usize) -> u64 {
        match (self.tag(), self.get(index)) {
            (Some(tag), Some(slot)) => tag.load_unsigned(slot),
            _ => 0,
        }
    }

    /// Find the index of the first element at or after `off` whose bytes
    /// equal the first `width` bytes of `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flex_svec::SVec;
    /// let v = SVec::from_ints(&[3u8, 1, 3]);
    /// assert_eq!(v.find(0, &[3]), Some(0));
    /// assert_eq!(v.find(1, &[3]), Some(2));
    /// assert_eq!(v.find(0, &[2]), None);
    /// ```
    pub fn find(&self, off: usize, target: &[u8]) -> Option<usize> {
        let width = self.width();
        if width == 0 || target.len() < width {
            return None;
        }
        let target = &target[..width];
        self.as_bytes()
            .chunks_exact(width)
            .enumerate()
            .skip(off)
            .find(|(_, elem)| *elem == target)
            .map(|(index, _)| index)
    }

    /// Find a signed value, narrowed to the element type, at or after `off`.
    #[inline]
    pub fn find_i(&self, off: usize, target: i64) -> Option<usize> {
        self.find_narrowed(off, |tag, slot| tag.store_signed(slot, target))
    }

    /// Find an unsigned value, narrowed to the element type, at or after `off`.
    #[inline]
    pub fn find_u(&self, off: usize, target: u64) -> Option<usize> {
        self.find_narrowed(off, |tag, slot| tag.store_unsigned(slot, target))
    }

    fn find_narrowed(&self, off: usize, store: impl FnOnce(Tag, &mut [u8])) -> Option<usize> {
        let tag = self.tag().filter(|tag| tag.is_integer())?;
        let mut slot = [0u8; 8];
        let slot = &mut slot[..tag.width()];
        store(tag, slot);
        self.find(off, slot)
    }

    /// Compare up to `n` elements starting at `off` with those of `other`
    /// starting at `other_off`, byte-wise using this vector's element width.
    /// The count is limited by the elements remaining on either side.
    ///
    /// The sentinel sorts before any allocated vector.
    pub fn ncmp<B: Allocator>(
        &self,
        off: usize,
        other: &SVec<B>,
        other_off: usize,
        n: usize,
    ) -> Ordering {
        match (self.is_sentinel(), other.is_sentinel()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => (),
        }
        let width = self.width();
        let left = self.len().saturating_sub(off);
        let right = other.len().saturating_sub(other_off);
        let count = n.min(left).min(right) * width;
        let a = self.as_bytes();
        let a = &a[off.saturating_mul(width).min(a.len())..];
        let b = other.as_bytes();
        let b = &b[other_off.saturating_mul(other.width()).min(b.len())..];
        a[..count.min(a.len())].cmp(&b[..count.min(b.len())])
    }

    /// Iterate the elements widened to `i64`.
    #[inline]
    pub fn iter_i(&self) -> IterSigned<'_> {
        IterSigned(self.iter_slots())
    }

    /// Iterate the elements widened to `u64`.
    #[inline]
    pub fn iter_u(&self) -> IterUnsigned<'_> {
        IterUnsigned(self.iter_slots())
    }

    #[inline]
    fn iter_slots(&self) -> Slots<'_> {
        match self.tag() {
            Some(tag) if tag.is_integer() => Slots {
                tag,
                chunks: Some(self.as_bytes().chunks_exact(tag.width())),
            },
            _ => Slots {
                tag: Tag::Generic,
                chunks: None,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct Slots<'a> {
    tag: Tag,
    chunks: Option<ChunksExact<'a, u8>>,
}

impl<'a> Slots<'a> {
    #[inline]
    fn next(&mut self) -> Option<(Tag, &'a [u8])> {
        let slot = self.chunks.as_mut()?.next()?;
        Some((self.tag, slot))
    }

    #[inline]
    fn next_back(&mut self) -> Option<(Tag, &'a [u8])> {
        let slot = self.chunks.as_mut()?.next_back()?;
        Some((self.tag, slot))
    }

    #[inline]
    fn len(&self) -> usize {
        self.chunks.as_ref().map_or(0, |chunks| chunks.len())
    }
}

/// An iterator over the elements of an integer vector widened to `i64`.
/// Generic vectors produce no items.
#[derive(Debug, Clone)]
pub struct IterSigned<'a>(Slots<'a>);

/// An iterator over the elements of an integer vector widened to `u64`.
/// Generic vectors produce no items.
#[derive(Debug, Clone)]
pub struct IterUnsigned<'a>(Slots<'a>);

macro_rules! impl_iter {
    ($iter:ident, $item:ty, $load:ident) => {
        impl Iterator for $iter<'_> {
            type Item = $item;

            #[inline]
            fn next(&mut self) -> Option<$item> {
                self.0.next().map(|(tag, slot)| tag.$load(slot))
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                let len = self.0.len();
                (len, Some(len))
            }
        }

        impl DoubleEndedIterator for $iter<'_> {
            #[inline]
            fn next_back(&mut self) -> Option<$item> {
                self.0.next_back().map(|(tag, slot)| tag.$load(slot))
            }
        }

        impl ExactSizeIterator for $iter<'_> {}

        impl FusedIterator for $iter<'_> {}
    };
}

impl_iter!(IterSigned, i64, load_signed);
impl_iter!(IterUnsigned, u64, load_unsigned);
