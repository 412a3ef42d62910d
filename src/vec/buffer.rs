use crate::storage::BufferHeader;
use crate::tag::Tag;

/// The header stored at the front of every vector allocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct VecHeader {
    pub length: usize,
    pub capacity: usize,
    pub width: usize,
    pub tag: Tag,
    pub external: bool,
}

impl VecHeader {
    #[inline]
    pub const fn new(tag: Tag, width: usize, capacity: usize, external: bool) -> Self {
        Self {
            length: 0,
            capacity,
            width,
            tag,
            external,
        }
    }

    /// A copy of this header with a different capacity.
    #[inline]
    pub const fn with_capacity(&self, capacity: usize) -> Self {
        Self { capacity, ..*self }
    }
}

impl BufferHeader for VecHeader {
    #[inline]
    fn data_len(&self) -> usize {
        // An overflow produces an unallocatable layout.
        self.capacity.checked_mul(self.width).unwrap_or(usize::MAX)
    }

    #[inline]
    fn update_for_alloc(&mut self, data_len: usize, exact: bool) {
        if !exact && self.width > 0 {
            self.capacity = data_len / self.width;
        }
    }
}

/// A borrowed, read-only view of the elements of a vector.
///
/// This is the form in which a distinct source vector takes part in a
/// mutation, independent of the allocator backing it.
#[derive(Debug, Clone, Copy)]
pub struct VecRef<'s> {
    pub(crate) tag: Option<Tag>,
    pub(crate) width: usize,
    pub(crate) bytes: &'s [u8],
}

impl<'s> VecRef<'s> {
    #[inline]
    pub(crate) fn new(header: Option<&VecHeader>, data: &'s [u8]) -> Self {
        match header {
            Some(header) => Self {
                tag: Some(header.tag),
                width: header.width,
                bytes: &data[..header.length * header.width],
            },
            None => Self {
                tag: None,
                width: 0,
                bytes: &[],
            },
        }
    }

    /// Get the element type of the viewed vector, or `None` for the sentinel.
    #[inline]
    pub fn tag(&self) -> Option<Tag> {
        self.tag
    }

    /// Get the number of elements in the viewed vector.
    #[inline]
    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.bytes.len() / self.width
        }
    }

    /// Check whether the viewed vector holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Access the bytes of the elements in use.
    #[inline]
    pub fn as_bytes(&self) -> &'s [u8] {
        self.bytes
    }

    /// The bytes of the `count` elements starting at `offset`.
    #[inline]
    pub(crate) fn elements(&self, offset: usize, count: usize) -> &'s [u8] {
        &self.bytes[offset * self.width..(offset + count) * self.width]
    }
}
