use core::alloc::{Layout, LayoutError};
use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;
use core::ptr::{self, NonNull};
use core::slice;

use const_default::ConstDefault;

use crate::alloc::{AllocateIn, Allocator, AllocatorDefault};
use crate::error::StorageError;

/// A header type stored at the front of a buffer allocation.
pub(crate) trait BufferHeader: Copy + fmt::Debug + Sized {
    /// The number of data bytes described by this header.
    fn data_len(&self) -> usize;

    /// Update the header from the result of a new allocation, given the
    /// number of usable data bytes following the header.
    fn update_for_alloc(&mut self, data_len: usize, exact: bool);

    /// Calculate the layout of the data following the header.
    #[inline]
    fn data_layout(&self) -> Result<Layout, LayoutError> {
        Layout::from_size_align(self.data_len(), 1)
    }
}

pub(crate) struct ThinPtr<H: BufferHeader>(NonNull<u8>, PhantomData<H>);

impl<H: BufferHeader> ThinPtr<H> {
    // The data is byte-aligned, so it starts directly after the header.
    const DATA_OFFSET: usize = size_of::<H>();

    #[inline]
    pub const fn dangling() -> Self {
        Self(NonNull::dangling(), PhantomData)
    }

    #[inline]
    pub fn is_dangling(&self) -> bool {
        ptr::eq(self.0.as_ptr(), NonNull::<u8>::dangling().as_ptr())
    }

    #[inline]
    fn from_alloc(mut header: H, ptr: NonNull<[u8]>, exact: bool) -> Self {
        header.update_for_alloc(ptr.len().saturating_sub(Self::DATA_OFFSET), exact);
        let head = ptr.cast::<u8>();
        unsafe {
            head.cast::<H>().as_ptr().write(header);
            Self(
                NonNull::new_unchecked(head.as_ptr().add(Self::DATA_OFFSET)),
                PhantomData,
            )
        }
    }

    #[inline]
    fn layout(header: &H) -> Result<Layout, LayoutError> {
        let (layout, _) = Layout::new::<H>().extend(header.data_layout()?)?;
        Ok(layout)
    }

    #[inline]
    fn to_alloc(&self) -> NonNull<u8> {
        unsafe { NonNull::new_unchecked(self.header_ptr()) }.cast()
    }

    #[inline]
    fn header_ptr(&self) -> *mut H {
        unsafe { self.0.as_ptr().sub(Self::DATA_OFFSET) as *mut H }
    }
}

impl<H: BufferHeader> fmt::Debug for ThinPtr<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &self.0)
    }
}

/// A byte buffer allocation handle which stores its header metadata at the
/// front of the allocation. An unallocated handle is dangling and has no
/// header.
///
/// Every allocation is zero-filled, so all data bytes up to the capacity
/// recorded in the header are initialized.
#[derive(Debug)]
pub(crate) struct ThinBuffer<H: BufferHeader, A: Allocator> {
    data: ThinPtr<H>,
    alloc: A,
}

impl<H: BufferHeader, A: Allocator> ThinBuffer<H, A> {
    #[inline]
    pub(crate) fn allocate_in<I>(header: H, alloc_in: I, exact: bool) -> Result<Self, StorageError>
    where
        I: AllocateIn<Alloc = A>,
    {
        let layout = ThinPtr::layout(&header)?;
        let (ptr, alloc) = alloc_in
            .allocate_zeroed_in(layout)
            .map_err(|_| StorageError::AllocError(layout))?;
        Ok(Self {
            data: ThinPtr::from_alloc(header, ptr, exact),
            alloc,
        })
    }

    /// Extend the allocation to match `new_header`, or create it if the
    /// handle is dangling.
    #[inline]
    pub(crate) fn grow(&mut self, new_header: H, exact: bool) -> Result<(), StorageError> {
        let new_layout = ThinPtr::layout(&new_header)?;
        let ptr = match self.header().copied() {
            None => self.alloc.allocate_zeroed(new_layout),
            Some(old_header) => {
                let old_layout = ThinPtr::layout(&old_header)?;
                unsafe {
                    self.alloc
                        .grow_zeroed(self.data.to_alloc(), old_layout, new_layout)
                }
            }
        }
        .map_err(|_| StorageError::AllocError(new_layout))?;
        self.data = ThinPtr::from_alloc(new_header, ptr, exact);
        Ok(())
    }

    /// Reduce the allocation to match `new_header`. Dangling handles are
    /// left unchanged.
    #[inline]
    pub(crate) fn shrink(&mut self, new_header: H) -> Result<(), StorageError> {
        let Some(old_header) = self.header().copied() else {
            return Ok(());
        };
        let old_layout = ThinPtr::layout(&old_header)?;
        let new_layout = ThinPtr::layout(&new_header)?;
        let ptr = unsafe {
            self.alloc
                .shrink(self.data.to_alloc(), old_layout, new_layout)
        }
        .map_err(|_| StorageError::AllocError(new_layout))?;
        self.data = ThinPtr::from_alloc(new_header, ptr, true);
        Ok(())
    }

    /// Release the allocation, leaving a dangling handle.
    #[inline]
    pub(crate) fn release(&mut self) {
        if let Some(header) = self.header().copied() {
            if let Ok(layout) = ThinPtr::layout(&header) {
                unsafe {
                    self.alloc.deallocate(self.data.to_alloc(), layout);
                }
            }
            self.data = ThinPtr::dangling();
        }
    }
}

impl<H: BufferHeader, A: Allocator> ThinBuffer<H, A> {
    #[inline]
    pub(crate) const fn dangling(alloc: A) -> Self {
        Self {
            data: ThinPtr::dangling(),
            alloc,
        }
    }

    #[inline]
    pub(crate) fn is_dangling(&self) -> bool {
        self.data.is_dangling()
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    pub(crate) fn header(&self) -> Option<&H> {
        if self.is_dangling() {
            None
        } else {
            Some(unsafe { &*self.data.header_ptr() })
        }
    }

    #[inline]
    pub(crate) fn header_mut(&mut self) -> Option<&mut H> {
        if self.is_dangling() {
            None
        } else {
            Some(unsafe { &mut *self.data.header_ptr() })
        }
    }

    /// Access the full data area of the allocation.
    #[inline]
    pub(crate) fn data(&self) -> &[u8] {
        let len = self.header().map(H::data_len).unwrap_or(0);
        unsafe { slice::from_raw_parts(self.data.0.as_ptr(), len) }
    }

    /// Mutably access the full data area of the allocation.
    #[inline]
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        let len = self.header().map(H::data_len).unwrap_or(0);
        unsafe { slice::from_raw_parts_mut(self.data.0.as_ptr(), len) }
    }
}

impl<H, A> ConstDefault for ThinBuffer<H, A>
where
    H: BufferHeader,
    A: AllocatorDefault,
{
    const DEFAULT: Self = Self::dangling(A::DEFAULT);
}

impl<H: BufferHeader, A: Allocator> Drop for ThinBuffer<H, A> {
    fn drop(&mut self) {
        self.release();
    }
}
