//! Support for typed and generic vectors.

use core::fmt;
use core::mem::MaybeUninit;

use const_default::ConstDefault;

use crate::alloc::{AllocateIn, Allocator, AllocatorDefault, Fixed, Global};
use crate::capacity::{Grow, GrowDoubling, GrowExact};
use crate::error::StorageError;
use crate::storage::ThinBuffer;
use crate::tag::{IntElement, Tag};

use self::buffer::VecHeader;

pub use self::{
    access::{IterSigned, IterUnsigned},
    buffer::VecRef,
    ops::Source,
};

mod access;
mod buffer;

#[macro_use]
mod macros;

mod ops;
mod push;

/// An `SVec` over a caller-supplied buffer.
pub type FixedSVec<'a> = SVec<Fixed<'a>>;

#[cfg(feature = "zeroize")]
/// An `SVec` which automatically zeroizes its buffer when released.
pub type ZeroizingSVec = SVec<crate::alloc::ZeroizingAlloc<Global>>;

/// A contiguous vector of elements whose type is chosen at runtime.
///
/// An allocated vector is tagged with one of the eight fixed-width integer
/// types, or is `Generic` with a caller-chosen element width. The length,
/// capacity, width and tag are stored at the front of the allocation, so the
/// handle itself is a single pointer plus the allocator.
///
/// A vector which has never been allocated, or which has been released, is
/// the *sentinel*: it has no type, no capacity and no allocation. Every
/// operation tolerates the sentinel, and operations carrying a source vector
/// replace it with a fresh allocation typed after the source.
///
/// Element data is treated as plain bytes and is never dropped or cloned
/// element-wise.
#[repr(transparent)]
pub struct SVec<A: Allocator = Global> {
    buffer: ThinBuffer<VecHeader, A>,
}

#[cfg(feature = "alloc")]
impl SVec {
    /// Constructs a new sentinel vector. This does not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flex_svec::SVec;
    /// let vec = SVec::new();
    /// assert!(vec.is_sentinel());
    /// assert_eq!(vec.capacity(), 0);
    /// ```
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Allocate an empty integer vector with room for `reserve` elements.
    ///
    /// Returns the sentinel when `tag` is `Generic` or the allocation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flex_svec::{SVec, Tag};
    /// let vec = SVec::with_type(Tag::I32, 10);
    /// assert_eq!(vec.tag(), Some(Tag::I32));
    /// assert_eq!(vec.width(), 4);
    /// assert!(vec.capacity() >= 10);
    /// ```
    pub fn with_type(tag: Tag, reserve: usize) -> Self {
        Self::try_with_type(tag, reserve).unwrap_or_default()
    }

    /// Try to allocate an empty integer vector with room for `reserve` elements.
    pub fn try_with_type(tag: Tag, reserve: usize) -> Result<Self, StorageError> {
        Self::try_with_type_in(tag, reserve, Global)
    }

    /// Allocate an empty `Generic` vector of `width`-byte elements with room
    /// for `reserve` elements.
    ///
    /// Returns the sentinel when `width` is zero or the allocation fails.
    pub fn with_width(width: usize, reserve: usize) -> Self {
        Self::try_with_width(width, reserve).unwrap_or_default()
    }

    /// Try to allocate an empty `Generic` vector of `width`-byte elements.
    pub fn try_with_width(width: usize, reserve: usize) -> Result<Self, StorageError> {
        Self::try_with_width_in(width, reserve, Global)
    }

    /// Create an integer vector holding the values of a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flex_svec::{SVec, Tag};
    /// let vec = SVec::from_ints(&[1u16, 2, 3]);
    /// assert_eq!(vec.tag(), Some(Tag::U16));
    /// assert_eq!(vec.at_u(2), 3);
    /// ```
    pub fn from_ints<T: IntElement>(values: &[T]) -> Self {
        Self::try_from_ints_in(values, Global).unwrap_or_default()
    }
}

impl<A: Allocator> SVec<A> {
    /// Constructs a new sentinel vector which will allocate in `alloc`.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            buffer: ThinBuffer::dangling(alloc),
        }
    }

    /// Try to allocate an empty integer vector in `alloc_in`.
    pub fn try_with_type_in<I>(tag: Tag, reserve: usize, alloc_in: I) -> Result<Self, StorageError>
    where
        I: AllocateIn<Alloc = A>,
    {
        if !tag.is_integer() {
            return Err(StorageError::Unsupported);
        }
        Self::try_allocate_in(VecHeader::new(tag, tag.width(), reserve, false), alloc_in)
    }

    /// Try to allocate an empty `Generic` vector of `width`-byte elements in
    /// `alloc_in`.
    pub fn try_with_width_in<I>(width: usize, reserve: usize, alloc_in: I) -> Result<Self, StorageError>
    where
        I: AllocateIn<Alloc = A>,
    {
        if width == 0 {
            return Err(StorageError::Unsupported);
        }
        Self::try_allocate_in(VecHeader::new(Tag::Generic, width, reserve, false), alloc_in)
    }

    /// Try to create an integer vector in `alloc_in` holding the values of a slice.
    pub fn try_from_ints_in<T, I>(values: &[T], alloc_in: I) -> Result<Self, StorageError>
    where
        T: IntElement,
        I: AllocateIn<Alloc = A>,
    {
        let mut vec = Self::try_with_type_in(T::TAG, values.len(), alloc_in)?;
        let width = T::TAG.width();
        for (slot, value) in vec.buffer.data_mut().chunks_exact_mut(width).zip(values) {
            value.write(slot);
        }
        vec.set_length(values.len());
        Ok(vec)
    }

    #[inline]
    fn try_allocate_in<I>(header: VecHeader, alloc_in: I) -> Result<Self, StorageError>
    where
        I: AllocateIn<Alloc = A>,
    {
        Ok(Self {
            buffer: ThinBuffer::allocate_in(header, alloc_in, false)?,
        })
    }

    /// Release every vector in `vecs`, leaving each as the sentinel.
    pub fn release_all<'v, V>(vecs: V)
    where
        V: IntoIterator<Item = &'v mut SVec<A>>,
        A: 'v,
    {
        for vec in vecs {
            vec.free();
        }
    }
}

impl<A: AllocatorDefault> SVec<A> {
    /// Allocate an empty integer vector in `alloc_in`, returning the sentinel
    /// on failure.
    pub fn with_type_in<I>(tag: Tag, reserve: usize, alloc_in: I) -> Self
    where
        I: AllocateIn<Alloc = A>,
    {
        Self::try_with_type_in(tag, reserve, alloc_in).unwrap_or_default()
    }

    /// Allocate an empty `Generic` vector in `alloc_in`, returning the
    /// sentinel on failure.
    pub fn with_width_in<I>(width: usize, reserve: usize, alloc_in: I) -> Self
    where
        I: AllocateIn<Alloc = A>,
    {
        Self::try_with_width_in(width, reserve, alloc_in).unwrap_or_default()
    }
}

impl<'a> SVec<Fixed<'a>> {
    /// Create an empty integer vector over a caller-supplied buffer.
    ///
    /// The capacity is whatever fits in the buffer after the header. The
    /// vector never grows beyond the buffer and releasing it leaves the
    /// buffer untouched. Returns the sentinel when the buffer is too small.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flex_svec::{storage::byte_storage, SVec, Tag};
    /// let mut buf = byte_storage::<128>();
    /// let mut vec = SVec::over_buffer(Tag::U8, &mut buf);
    /// assert!(vec.is_external());
    /// assert!(vec.push_u(7));
    /// ```
    pub fn over_buffer<I>(tag: Tag, storage: I) -> Self
    where
        I: AllocateIn<Alloc = Fixed<'a>>,
    {
        Self::try_over_buffer(tag, storage).unwrap_or_default()
    }

    /// Try to create an empty integer vector over a caller-supplied buffer.
    pub fn try_over_buffer<I>(tag: Tag, storage: I) -> Result<Self, StorageError>
    where
        I: AllocateIn<Alloc = Fixed<'a>>,
    {
        if !tag.is_integer() {
            return Err(StorageError::Unsupported);
        }
        Self::try_allocate_in(VecHeader::new(tag, tag.width(), 0, true), storage)
    }

    /// Create an empty `Generic` vector over a caller-supplied buffer.
    pub fn over_buffer_width<I>(width: usize, storage: I) -> Self
    where
        I: AllocateIn<Alloc = Fixed<'a>>,
    {
        Self::try_over_buffer_width(width, storage).unwrap_or_default()
    }

    /// Try to create an empty `Generic` vector over a caller-supplied buffer.
    pub fn try_over_buffer_width<I>(width: usize, storage: I) -> Result<Self, StorageError>
    where
        I: AllocateIn<Alloc = Fixed<'a>>,
    {
        if width == 0 {
            return Err(StorageError::Unsupported);
        }
        Self::try_allocate_in(VecHeader::new(Tag::Generic, width, 0, true), storage)
    }

    /// Create an empty integer vector over an uninitialized byte slice.
    pub fn over_slice(tag: Tag, buf: &'a mut [MaybeUninit<u8>]) -> Self {
        Self::over_buffer(tag, buf)
    }
}

impl<A: Allocator> SVec<A> {
    #[inline]
    fn header(&self) -> Option<&VecHeader> {
        self.buffer.header()
    }

    /// Get a reference to the allocator of this vector.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.buffer.allocator()
    }

    /// Get a read-only view of this vector's elements.
    #[inline]
    pub fn view(&self) -> VecRef<'_> {
        VecRef::new(self.header(), self.buffer.data())
    }

    /// The number of elements in use.
    #[inline]
    pub fn len(&self) -> usize {
        self.header().map_or(0, |h| h.length)
    }

    /// Check whether the vector holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of elements the allocation can hold, or zero for the sentinel.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.header().map_or(0, |h| h.capacity)
    }

    /// The number of elements which may be added without reallocating.
    #[inline]
    pub fn len_left(&self) -> usize {
        self.header().map_or(0, |h| h.capacity - h.length)
    }

    /// The size of one element in bytes, or zero for the sentinel.
    #[inline]
    pub fn width(&self) -> usize {
        self.header().map_or(0, |h| h.width)
    }

    /// The element type, or `None` for the sentinel.
    #[inline]
    pub fn tag(&self) -> Option<Tag> {
        self.header().map(|h| h.tag)
    }

    /// Check whether this vector is the unallocated sentinel.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.buffer.is_dangling()
    }

    /// Check whether this vector lives in a caller-supplied buffer.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.header().map_or(false, |h| h.external)
    }

    /// The number of bytes occupied by the elements in use.
    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.header().map_or(0, |h| h.length * h.width)
    }

    /// Access the bytes of the elements in use.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        let size = self.buffer_size();
        &self.buffer.data()[..size]
    }

    /// Mutably access the bytes of the elements in use.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let size = self.buffer_size();
        &mut self.buffer.data_mut()[..size]
    }

    /// Mutably access the whole allocated capacity, including the bytes past
    /// the current length. Combined with [`SVec::set_len`] this allows
    /// filling the vector by raw I/O.
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        self.buffer.data_mut()
    }

    /// Set the length of the vector to `min(len, capacity)`, returning
    /// `false` when `len` exceeded the capacity.
    ///
    /// Capacity bytes are always initialized, so this exposes whatever was
    /// last written there (zeros for fresh capacity).
    pub fn set_len(&mut self, len: usize) -> bool {
        match self.buffer.header_mut() {
            Some(header) => {
                header.length = len.min(header.capacity);
                len <= header.capacity
            }
            None => len == 0,
        }
    }

    #[inline]
    pub(crate) fn set_length(&mut self, len: usize) {
        if let Some(header) = self.buffer.header_mut() {
            debug_assert!(len <= header.capacity);
            header.length = len;
        }
    }

    /// Remove all elements, retaining the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.set_length(0);
    }

    /// Shorten the vector to `len` elements. Has no effect if the vector is
    /// already shorter.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.set_length(len);
        }
    }

    /// Ensure the capacity is at least `min_capacity` elements, growing
    /// geometrically. Returns the resulting capacity, which is smaller than
    /// requested if the allocation failed. The sentinel cannot be grown.
    pub fn reserve(&mut self, min_capacity: usize) -> usize {
        let _ = self.try_reserve(min_capacity);
        self.capacity()
    }

    /// Try to ensure the capacity is at least `min_capacity` elements.
    #[inline]
    pub fn try_reserve(&mut self, min_capacity: usize) -> Result<(), StorageError> {
        self._try_reserve::<GrowDoubling>(min_capacity)
    }

    /// Ensure the capacity is at least `min_capacity` elements, without
    /// over-allocating. Returns the resulting capacity.
    pub fn reserve_exact(&mut self, min_capacity: usize) -> usize {
        let _ = self.try_reserve_exact(min_capacity);
        self.capacity()
    }

    /// Try to ensure the capacity is at least `min_capacity` elements,
    /// without over-allocating.
    #[inline]
    pub fn try_reserve_exact(&mut self, min_capacity: usize) -> Result<(), StorageError> {
        self._try_reserve::<GrowExact>(min_capacity)
    }

    fn _try_reserve<G: Grow>(&mut self, min_capacity: usize) -> Result<(), StorageError> {
        let Some(header) = self.header().copied() else {
            return if min_capacity == 0 {
                Ok(())
            } else {
                Err(StorageError::Unsupported)
            };
        };
        if header.capacity >= min_capacity {
            return Ok(());
        }
        if header.external {
            return Err(StorageError::CapacityLimit);
        }
        let capacity = G::next_capacity(header.width, header.capacity, min_capacity);
        match self.buffer.grow(header.with_capacity(capacity), false) {
            // fall back to the exact size if the preferred one is unavailable
            Err(_) if capacity > min_capacity => {
                self.buffer.grow(header.with_capacity(min_capacity), false)
            }
            res => res,
        }
    }

    /// Ensure there is room for `extra` more elements. Returns the resulting
    /// capacity. The sentinel has no type to grow with and returns zero.
    pub fn grow(&mut self, extra: usize) -> usize {
        let _ = self.try_grow(extra);
        self.capacity()
    }

    /// Try to ensure there is room for `extra` more elements.
    pub fn try_grow(&mut self, extra: usize) -> Result<(), StorageError> {
        if self.is_sentinel() {
            return Err(StorageError::Unsupported);
        }
        let Some(min_capacity) = self.len().checked_add(extra) else {
            return Err(StorageError::CapacityLimit);
        };
        self.try_reserve(min_capacity)
    }

    /// Like [`SVec::grow`], but a sentinel is first allocated with the
    /// element type of `template`.
    pub fn grow_from<B: Allocator>(&mut self, template: &SVec<B>, extra: usize) -> usize {
        let _ = self.try_grow_from(template, extra);
        self.capacity()
    }

    /// Try to ensure there is room for `extra` more elements, allocating a
    /// sentinel with the element type of `template`.
    pub fn try_grow_from<B: Allocator>(
        &mut self,
        template: &SVec<B>,
        extra: usize,
    ) -> Result<(), StorageError> {
        if self.is_sentinel() {
            self.materialize(&template.view(), extra)
        } else {
            self.try_grow(extra)
        }
    }

    /// Ensure the capacity is at least `max` elements. A sentinel is
    /// allocated with the element type of `template`. Returns the resulting
    /// capacity.
    pub fn reserve_from<B: Allocator>(&mut self, template: &SVec<B>, max: usize) -> usize {
        let _ = self.try_reserve_from(template, max);
        self.capacity()
    }

    /// Try to ensure the capacity is at least `max` elements, allocating a
    /// sentinel with the element type of `template`.
    pub fn try_reserve_from<B: Allocator>(
        &mut self,
        template: &SVec<B>,
        max: usize,
    ) -> Result<(), StorageError> {
        if self.is_sentinel() {
            self.materialize(&template.view(), max)
        } else {
            self.try_reserve(max)
        }
    }

    /// Release unused capacity. External buffers keep their size.
    pub fn shrink(&mut self) {
        let _ = self.try_shrink();
    }

    /// Try to release unused capacity.
    pub fn try_shrink(&mut self) -> Result<(), StorageError> {
        match self.header().copied() {
            Some(header) if !header.external && header.capacity > header.length => {
                self.buffer.shrink(header.with_capacity(header.length))
            }
            _ => Ok(()),
        }
    }

    /// Release the allocation, leaving the sentinel. External buffers are
    /// not touched.
    pub fn free(&mut self) {
        self.buffer.release();
    }
}

impl<A: AllocatorDefault> ConstDefault for SVec<A> {
    const DEFAULT: Self = Self {
        buffer: ThinBuffer::DEFAULT,
    };
}

impl<A: AllocatorDefault> Default for SVec<A> {
    #[inline]
    fn default() -> Self {
        Self::new_in(A::DEFAULT)
    }
}

impl<A: Allocator> fmt::Debug for SVec<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            None => f.write_str("Unset[]"),
            Some(Tag::Generic) => {
                write!(f, "Generic({})", self.width())?;
                f.debug_list()
                    .entries(self.as_bytes().chunks_exact(self.width()))
                    .finish()
            }
            Some(tag) => {
                write!(f, "{:?}", tag)?;
                if tag.is_signed() {
                    f.debug_list().entries(self.iter_i()).finish()
                } else {
                    f.debug_list().entries(self.iter_u()).finish()
                }
            }
        }
    }
}

impl<A: Allocator, B: Allocator> PartialEq<SVec<B>> for SVec<A> {
    fn eq(&self, other: &SVec<B>) -> bool {
        match (self.header(), other.header()) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.tag == b.tag && a.width == b.width && self.as_bytes() == other.as_bytes()
            }
            _ => false,
        }
    }
}

impl<A: Allocator> Eq for SVec<A> {}

// The buffer is uniquely owned by the handle.
unsafe impl<A: Allocator + Send> Send for SVec<A> {}

unsafe impl<A: Allocator + Sync> Sync for SVec<A> {}

#[cfg(feature = "zeroize")]
impl<A: Allocator> zeroize::Zeroize for SVec<A> {
    fn zeroize(&mut self) {
        zeroize::Zeroize::zeroize(self.buffer_mut());
        self.clear();
    }
}

#[cfg(feature = "zeroize")]
impl<A: crate::alloc::AllocatorZeroizes> zeroize::ZeroizeOnDrop for SVec<A> {}
