//! Typed and generic vectors over flexible storage.
//!
//! An [`SVec`] holds either one of eight fixed-width integer element types or
//! opaque `Generic` elements of a caller-chosen width. Its length, capacity
//! and element type live in a header at the front of the allocation, so the
//! handle itself is pointer-sized for zero-sized allocators.
//!
//! Vectors may be backed by the global allocator, by any allocator
//! implementing the `allocator-api2` interface, or by a fixed buffer supplied
//! by the caller.
//!
//! ```
//! # use flex_svec::{SVec, Source, Tag};
//! let mut v = SVec::with_type(Tag::U8, 4);
//! v.push_u(1);
//! v.push_u(2);
//! v.cat(Source::This);
//! assert_eq!(v.as_bytes(), &[1, 2, 1, 2]);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(feature = "nightly", feature(allocator_api))]
#![warn(missing_docs)]

#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc as alloc_crate;

pub mod alloc;

pub mod capacity;

pub(crate) mod error;

pub mod storage;

pub mod tag;

pub mod vec;

pub use {
    self::error::StorageError,
    self::storage::{aligned_byte_storage, byte_storage, ByteStorage},
    self::tag::{IntElement, Tag},
    self::vec::{FixedSVec, SVec, Source, VecRef},
};

#[cfg(feature = "zeroize")]
pub use self::vec::ZeroizingSVec;
