//! Backing storage for vectors.

mod alloc;
mod bytes;
pub(crate) mod utils;

pub use self::bytes::ByteStorage;

pub(crate) use self::alloc::{BufferHeader, ThinBuffer};

use const_default::ConstDefault;

/// Create a new byte storage buffer for a maximum byte capacity `N`.
pub const fn byte_storage<const N: usize>() -> ByteStorage<u8, N> {
    ByteStorage::DEFAULT
}

/// Create a new byte storage buffer for a maximum byte capacity `N`, with
/// a memory alignment matching type `T`.
pub const fn aligned_byte_storage<T, const N: usize>() -> ByteStorage<T, N> {
    ByteStorage::DEFAULT
}
