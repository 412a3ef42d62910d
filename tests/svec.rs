#![cfg_attr(feature = "nightly", feature(allocator_api))]

#[cfg(feature = "alloc")]
use core::alloc::Layout;
#[cfg(feature = "alloc")]
use core::cell::Cell;
use core::cmp::Ordering;
use core::mem::MaybeUninit;
#[cfg(feature = "alloc")]
use core::ptr::NonNull;

use rstest::rstest;

#[cfg(feature = "alloc")]
use flex_svec::alloc::{AllocError, Allocator, Fixed, Global};
use flex_svec::{
    alloc::AllocateIn, aligned_byte_storage, byte_storage, FixedSVec, SVec, Source, StorageError,
    Tag,
};

/// Forwards to `A`, failing the next `fail` allocation requests.
#[cfg(feature = "alloc")]
#[derive(Debug)]
struct FlakyAlloc<A: Allocator> {
    alloc: A,
    fail: Cell<usize>,
}

#[cfg(feature = "alloc")]
impl<A: Allocator> FlakyAlloc<A> {
    fn new(alloc: A) -> Self {
        Self {
            alloc,
            fail: Cell::new(0),
        }
    }
}

#[cfg(feature = "alloc")]
unsafe impl<A: Allocator> Allocator for &FlakyAlloc<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        match self.fail.get() {
            0 => self.alloc.allocate(layout),
            n => {
                self.fail.set(n - 1);
                Err(AllocError)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.alloc.deallocate(ptr, layout)
    }
}

#[rstest]
#[cfg_attr(feature = "alloc", case::global(Global))]
#[case::aligned(&mut aligned_byte_storage::<u64, 1000>())]
#[case::bytes(&mut byte_storage::<1000>())]
fn svec_with_type_in<A: AllocateIn>(#[case] buf: A) {
    let v = SVec::try_with_type_in(Tag::I32, 10, buf).expect("allocation");
    assert_eq!(v.tag(), Some(Tag::I32));
    assert_eq!(v.width(), 4);
    assert!(v.capacity() >= 10);
    assert!(v.is_empty());
}

#[rstest]
#[cfg_attr(feature = "alloc", case::global(Global))]
#[case::aligned(&mut aligned_byte_storage::<u64, 1000>())]
#[case::bytes(&mut byte_storage::<1000>())]
fn svec_self_append<A: AllocateIn>(
    #[case] buf: A,
    #[values(0, 1, 2, 100)] len: usize,
) {
    let mut v = SVec::try_with_type_in(Tag::U16, 0, buf).expect("allocation");
    for i in 0..len {
        assert!(v.push_u(i as u64));
    }
    v.cat(Source::This);
    assert_eq!(v.len(), len * 2);
    for i in 0..len {
        assert_eq!(v.at_u(i), i as u64);
        assert_eq!(v.at_u(len + i), i as u64);
    }
}

#[rstest]
#[cfg_attr(feature = "alloc", case::global(Global))]
#[case::bytes(&mut byte_storage::<1000>())]
fn svec_self_erase_interior<A: AllocateIn>(#[case] buf: A) {
    let mut v = SVec::try_with_type_in(Tag::U8, 5, buf).expect("allocation");
    v.push_raw(&[1, 2, 3, 4, 5]);
    v.erase(1, 2);
    assert_eq!(v.as_bytes(), &[1, 4, 5]);
}

#[rstest]
#[cfg_attr(feature = "alloc", case::global(Global))]
#[case::bytes(&mut byte_storage::<1000>())]
fn svec_tail_erase_only_truncates<A: AllocateIn>(#[case] buf: A) {
    let mut v = SVec::try_with_type_in(Tag::U8, 5, buf).expect("allocation");
    v.push_raw(&[1, 2, 3, 4, 5]);
    v.cat_erase(Source::This, 3, 10);
    assert_eq!(v.len(), 3);
    assert_eq!(v.as_bytes(), &[1, 2, 3]);
    // the erased bytes remain in the buffer
    assert!(v.set_len(5));
    assert_eq!(v.as_bytes(), &[1, 2, 3, 4, 5]);
}

#[cfg(feature = "alloc")]
#[test]
fn svec_type_mismatch() {
    let src = SVec::from_ints(&[1i32, 2]);

    let mut dst = SVec::from_ints(&[1u8, 2, 3]);
    dst.cpy(&src);
    assert_eq!(dst.len(), 0);
    assert_eq!(dst.tag(), Some(Tag::U8));

    let mut dst = SVec::from_ints(&[1u8, 2, 3]);
    dst.cat(&src);
    assert_eq!(dst.as_bytes(), &[1, 2, 3]);

    let mut dst = SVec::from_ints(&[1u8, 2, 3]);
    assert_eq!(dst.try_cat_erase(&src, 0, 1), Err(StorageError::Incompatible));
    assert_eq!(dst.len(), 3);
    assert_eq!(dst.try_cpy_resize(&src, 1), Err(StorageError::Incompatible));
    assert_eq!(dst.len(), 0);
}

#[cfg(feature = "alloc")]
#[test]
fn svec_reserve_idempotent() {
    let mut v = SVec::with_type(Tag::U32, 0);
    let cap = v.reserve(100);
    assert!(cap >= 100);
    assert_eq!(v.reserve(100), cap);
    assert_eq!(v.reserve(10), cap);
    assert_eq!(v.capacity(), cap);
}

#[cfg(feature = "alloc")]
#[test]
fn svec_check_capacity_growth() {
    let mut res = [0usize; 10];
    let mut v = SVec::with_type(Tag::U32, 0);
    for cap in res.iter_mut() {
        v.push_u(1);
        *cap = v.capacity();
    }
    assert_eq!(res, [4, 4, 4, 4, 8, 8, 8, 8, 16, 16]);
}

#[rstest]
#[cfg_attr(feature = "alloc", case::global(Global))]
#[case::aligned(&mut aligned_byte_storage::<u64, 1000>())]
fn svec_i64_round_trip<A: AllocateIn>(#[case] buf: A) {
    let values = [i64::MIN, -1, 0, 1, i64::MAX];
    let mut v = SVec::try_with_type_in(Tag::I64, 0, buf).expect("allocation");
    for value in values {
        assert!(v.push_i(value));
    }
    for value in values.iter().rev() {
        assert_eq!(v.pop_i(), *value);
    }
    assert!(v.is_empty());
    assert_eq!(v.pop_i(), 0);
}

#[cfg(feature = "alloc")]
#[test]
fn svec_find_not_found() {
    let empty = SVec::with_type(Tag::I32, 0);
    assert_eq!(empty.find_i(0, 0), None);
    assert_eq!(SVec::new().find(0, &[0]), None);

    let v = SVec::from_ints(&[0i32, 5, 0]);
    assert_eq!(v.find_i(0, 0), Some(0));
    assert_eq!(v.find_i(1, 0), Some(2));
    assert_eq!(v.find_i(0, 6), None);
    assert_eq!(v.find_i(3, 0), None);
}

#[rstest]
#[cfg(feature = "alloc")]
#[case::i8(Tag::I8, 300, 44)]
#[case::u8(Tag::U8, -1, 255)]
#[case::i16(Tag::I16, 70000, 4464)]
#[case::i32(Tag::I32, 1 << 32, 0)]
fn svec_narrowing(#[case] tag: Tag, #[case] value: i64, #[case] expected: i64) {
    let mut v = SVec::with_type(tag, 1);
    assert!(v.push_i(value));
    assert_eq!(v.at_i(0), expected);
}

#[cfg(feature = "alloc")]
#[test]
fn svec_dup_independent() {
    let mut v = SVec::from_ints(&[1u64, 2, 3]);
    let d = v.dup();
    assert_eq!(d, v);
    v.push_u(4);
    v.as_bytes_mut()[0] = 9;
    assert_eq!(d.len(), 3);
    assert_eq!(d.at_u(0), 1);
    assert_ne!(d, v);
}

#[test]
fn svec_fixed_allocation_failure() {
    let mut buf = aligned_byte_storage::<u64, 64>();
    let mut v = SVec::over_buffer(Tag::U64, &mut buf);
    assert!(v.is_external());
    let cap = v.capacity();
    assert!(cap > 0);
    for i in 0..cap {
        assert!(v.push_u(i as u64));
    }
    assert_eq!(v.len_left(), 0);
    assert!(!v.push_u(99));
    assert_eq!(v.try_push_u(99), Err(StorageError::CapacityLimit));
    assert_eq!(v.len(), cap);

    // self-append cannot grow, content is preserved
    assert!(v.try_cat(Source::This).is_err());
    assert_eq!(v.len(), cap);
    assert_eq!(v.at_u(cap - 1), (cap - 1) as u64);

    v.free();
    assert!(v.is_sentinel());
}

#[test]
fn svec_fixed_too_small() {
    let mut buf = byte_storage::<8>();
    assert!(SVec::over_buffer(Tag::U8, &mut buf).is_sentinel());
    let mut buf = byte_storage::<8>();
    assert!(matches!(
        FixedSVec::try_over_buffer_width(4, &mut buf),
        Err(StorageError::AllocError(_))
    ));
}

#[test]
fn svec_over_slice() {
    let mut raw = [MaybeUninit::<u8>::uninit(); 256];
    let mut v = SVec::over_slice(Tag::I16, &mut raw);
    assert!(v.push_i(-2));
    assert_eq!(v.pop_i(), -2);
    drop(v);
    assert!(SVec::over_slice(Tag::Generic, &mut raw).is_sentinel());
}

#[test]
fn svec_generic_over_buffer() {
    let mut buf = byte_storage::<128>();
    let mut v = SVec::over_buffer_width(3, &mut buf);
    assert_eq!(v.tag(), Some(Tag::Generic));
    assert!(v.push_raw(&[1, 2, 3, 4, 5, 6]));
    assert_eq!(v.at(1), &[4, 5, 6]);
    assert_eq!(v.find(0, &[4, 5, 6, 7]), Some(1));
    assert_eq!(v.pop(), Some(&[4u8, 5, 6][..]));
    assert!(!v.push_i(1));
}

#[cfg(feature = "alloc")]
#[test]
fn svec_sentinel_takes_type_from_source() {
    let mut buf = byte_storage::<256>();
    let mut ext = SVec::over_buffer(Tag::I8, &mut buf);
    ext.push_raw(&[1, 2]);

    let mut v = SVec::new();
    v.cat_erase(&ext, 0, 1);
    assert_eq!(v.tag(), Some(Tag::I8));
    assert!(!v.is_external());
    assert_eq!(v.as_bytes(), &[2]);

    let mut v = SVec::new();
    assert_eq!(v.reserve_from(&ext, 10), 10);
    assert_eq!(v.tag(), Some(Tag::I8));

    let mut v = SVec::new();
    assert!(v.grow_from(&ext, 3) >= 3);
    assert_eq!(v.grow(2), v.capacity());
}

#[cfg(feature = "alloc")]
#[test]
fn svec_cat_many_repeated_self() {
    let extra = SVec::from_ints(&[9u32]);
    let mut v = SVec::from_ints(&[1u32, 2]);
    v.cat_many(&[Source::This, Source::This, Source::from(&extra)]);
    assert_eq!(v, SVec::from_ints(&[1u32, 2, 1, 2, 1, 2, 9]));

    let mut v = SVec::new();
    v.cat_many(&[Source::This, Source::from(&extra), Source::This]);
    assert_eq!(v, extra);
}

#[cfg(feature = "alloc")]
#[test]
fn svec_ncmp() {
    let a = SVec::from_ints(&[1u8, 2, 3]);
    let b = a.dup_erase(0, 1);
    assert_eq!(a.ncmp(1, &b, 0, 2), Ordering::Equal);
    assert_eq!(a.ncmp(0, &b, 0, 2), Ordering::Less);
    assert_eq!(b.ncmp(0, &a, 0, 2), Ordering::Greater);
    assert_eq!(SVec::new().ncmp(0, &a, 0, 1), Ordering::Less);
}

#[cfg(feature = "alloc")]
#[test]
fn svec_release_all() {
    let mut a = SVec::with_type(Tag::U8, 4);
    let mut b = SVec::with_width(16, 4);
    let mut c = SVec::new();
    SVec::release_all([&mut a, &mut b, &mut c]);
    assert!(a.is_sentinel() && b.is_sentinel() && c.is_sentinel());
}

#[cfg(feature = "alloc")]
#[test]
fn svec_macro() {
    let v = flex_svec::svec![Tag::U8; 1, 2, 300];
    assert_eq!(v.as_bytes(), &[1, 2, 44]);
    let v = flex_svec::svec![Tag::I64];
    assert_eq!(v.tag(), Some(Tag::I64));
    assert!(v.is_empty());
    assert!(flex_svec::svec![Tag::Generic; 1].is_sentinel());
}

#[cfg(feature = "alloc")]
#[test]
fn svec_debug() {
    assert_eq!(format!("{:?}", SVec::from_ints(&[-1i8, 2])), "I8[-1, 2]");
    assert_eq!(format!("{:?}", SVec::new()), "Unset[]");
    let mut g = SVec::with_width(2, 1);
    g.push_raw(&[1, 2]);
    assert_eq!(format!("{:?}", g), "Generic(2)[[1, 2]]");
}

#[cfg(feature = "alloc")]
#[test]
fn svec_push_many_counts_each_value() {
    // growing once for the batch and then the first push both fail
    let alloc = FlakyAlloc::new(Global);
    let mut typed = SVec::try_with_type_in(Tag::I64, 0, &alloc).expect("allocation");
    alloc.fail.set(4);
    assert_eq!(typed.push_many_i(&[1, 2]), 1);
    assert_eq!(typed.iter_i().collect::<Vec<_>>(), [2]);

    let alloc = FlakyAlloc::new(Global);
    let mut raw = SVec::try_with_type_in(Tag::I64, 0, &alloc).expect("allocation");
    alloc.fail.set(4);
    assert_eq!(
        raw.push_many(&[&1i64.to_ne_bytes(), &2i64.to_ne_bytes()]),
        1
    );
    assert_eq!(raw, typed);

    let alloc = FlakyAlloc::new(Global);
    let mut unsigned = SVec::try_with_type_in(Tag::U16, 0, &alloc).expect("allocation");
    alloc.fail.set(4);
    assert_eq!(unsigned.push_many_u(&[7, 8, 9]), 2);
    assert_eq!(unsigned.iter_u().collect::<Vec<_>>(), [8, 9]);
}

#[rstest]
#[cfg_attr(feature = "alloc", case::global(Global))]
#[case::bytes(&mut byte_storage::<1000>())]
fn svec_resize_truncates<A: AllocateIn>(#[case] buf: A) {
    let mut v = SVec::try_with_type_in(Tag::U8, 4, buf).expect("allocation");
    v.push_raw(&[1, 2, 3, 4]);
    let cap = v.capacity();
    v.resize(10);
    assert_eq!(v.as_bytes(), &[1, 2, 3, 4]);
    v.resize(2);
    assert_eq!(v.as_bytes(), &[1, 2]);
    assert_eq!(v.capacity(), cap);
    v.resize(0);
    assert!(v.is_empty());
}

#[cfg(feature = "alloc")]
#[test]
fn svec_dup_into_allocator() {
    let v = SVec::from_ints(&[-1i32, 2, 3]);
    let alloc = FlakyAlloc::new(Global);
    let d = v.try_dup_in(2, &alloc).expect("duplicate");
    assert_eq!(d, SVec::from_ints(&[-1i32, 2]));
    assert!(!d.is_external());

    alloc.fail.set(1);
    assert!(matches!(
        v.try_dup_in(usize::MAX, &alloc),
        Err(StorageError::AllocError(_))
    ));
    assert!(matches!(
        v.try_dup_in(1, Fixed::default()),
        Err(StorageError::AllocError(_))
    ));
    assert_eq!(
        SVec::new().try_dup_in(1, Global).err(),
        Some(StorageError::Unsupported)
    );
}

#[cfg(feature = "alloc")]
#[test]
fn svec_reserve_exact_has_no_slack() {
    let mut v = SVec::with_type(Tag::U32, 0);
    assert_eq!(v.reserve_exact(5), 5);
    assert_eq!(v.reserve_exact(3), 5);
    assert_eq!(v.try_reserve_exact(7), Ok(()));
    assert_eq!(v.capacity(), 7);
    assert_eq!(v.reserve(8), 14);

    let mut unset = SVec::new();
    assert_eq!(unset.try_reserve_exact(0), Ok(()));
    assert_eq!(unset.try_reserve_exact(1), Err(StorageError::Unsupported));

    let mut buf = byte_storage::<64>();
    let mut ext = SVec::over_buffer(Tag::U8, &mut buf);
    let cap = ext.capacity();
    assert_eq!(
        ext.try_reserve_exact(cap + 1),
        Err(StorageError::CapacityLimit)
    );
}

#[cfg(feature = "alloc")]
#[test]
fn svec_buffer_size() {
    let mut v = SVec::from_ints(&[1u32, 2, 3]);
    assert_eq!(v.buffer_size(), 12);
    assert_eq!(v.buffer_size(), v.as_bytes().len());
    v.pop();
    assert_eq!(v.buffer_size(), 8);
    let mut g = SVec::with_width(5, 2);
    g.push_raw(&[0; 10]);
    assert_eq!(g.buffer_size(), 10);
    assert_eq!(SVec::new().buffer_size(), 0);
}
