use core::alloc::Layout;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use crate::error::StorageError;

/// Find the aligned region of `buf` suitable for `layout`, returning the
/// whole remainder of the buffer after the alignment offset.
#[inline]
pub fn layout_aligned_bytes(
    buf: &mut [MaybeUninit<u8>],
    layout: Layout,
) -> Result<NonNull<[u8]>, StorageError> {
    let start = buf.as_mut_ptr();
    let offset = start.align_offset(layout.align());
    let max_cap = buf.len().saturating_sub(offset);
    if max_cap < layout.size() || offset > buf.len() {
        Err(StorageError::CapacityLimit)
    } else {
        // SAFETY: `offset` is within the bounds of `buf`.
        let head = unsafe { NonNull::new_unchecked((start as *mut u8).add(offset)) };
        Ok(NonNull::slice_from_raw_parts(head, max_cap))
    }
}
