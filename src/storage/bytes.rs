use core::alloc::Layout;
use core::fmt;
use core::mem::{ManuallyDrop, MaybeUninit};
use core::ptr::NonNull;

use const_default::ConstDefault;

use super::utils::layout_aligned_bytes;
use crate::alloc::{AllocError, AllocateIn, Fixed};

/// A reusable storage buffer consisting of an array of bytes.
#[repr(C)]
pub union ByteStorage<T, const N: usize> {
    _align: [ManuallyDrop<T>; 0],
    data: [MaybeUninit<u8>; N],
}

impl<T, const N: usize> ByteStorage<T, N> {
    /// Access the buffer contents as a mutable slice.
    pub fn as_uninit_slice(&mut self) -> &mut [MaybeUninit<u8>] {
        unsafe { &mut self.data }
    }
}

impl<'a, T, const N: usize> AllocateIn for &'a mut ByteStorage<T, N> {
    type Alloc = Fixed<'a>;

    #[inline]
    fn allocate_in(self, layout: Layout) -> Result<(NonNull<[u8]>, Self::Alloc), AllocError> {
        self.as_uninit_slice().allocate_in(layout)
    }
}

impl<'a> AllocateIn for &'a mut [MaybeUninit<u8>] {
    type Alloc = Fixed<'a>;

    #[inline]
    fn allocate_in(self, layout: Layout) -> Result<(NonNull<[u8]>, Self::Alloc), AllocError> {
        let ptr = layout_aligned_bytes(self, layout).map_err(|_| AllocError)?;
        Ok((ptr, Fixed::default()))
    }
}

impl<T, const N: usize> ConstDefault for ByteStorage<T, N> {
    const DEFAULT: Self = Self {
        data: [MaybeUninit::uninit(); N],
    };
}

impl<T, const N: usize> fmt::Debug for ByteStorage<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStorage").finish_non_exhaustive()
    }
}

impl<T, const N: usize> Default for ByteStorage<T, N> {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "zeroize")]
impl<T, const N: usize> zeroize::Zeroize for ByteStorage<T, N> {
    #[inline]
    fn zeroize(&mut self) {
        self.as_uninit_slice().zeroize()
    }
}
