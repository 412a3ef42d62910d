//! Element type tags and the conversions between native element storage
//! and the canonical 64-bit integer representation.

use core::fmt::Debug;
use core::mem::size_of;

/// The element kind of a vector.
///
/// Integer tags have a canonical element width; `Generic` vectors hold
/// opaque elements of a caller-chosen width.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Signed 8-bit integers
    I8,
    /// Unsigned 8-bit integers
    U8,
    /// Signed 16-bit integers
    I16,
    /// Unsigned 16-bit integers
    U16,
    /// Signed 32-bit integers
    I32,
    /// Unsigned 32-bit integers
    U32,
    /// Signed 64-bit integers
    I64,
    /// Unsigned 64-bit integers
    U64,
    /// Opaque elements of any non-zero width
    Generic,
}

// Expands `$body` once per integer tag with `$t` bound to the native type.
macro_rules! dispatch {
    ($tag:expr, $t:ident => $body:expr, _ => $generic:expr) => {
        match $tag {
            Tag::I8 => {
                type $t = i8;
                $body
            }
            Tag::U8 => {
                type $t = u8;
                $body
            }
            Tag::I16 => {
                type $t = i16;
                $body
            }
            Tag::U16 => {
                type $t = u16;
                $body
            }
            Tag::I32 => {
                type $t = i32;
                $body
            }
            Tag::U32 => {
                type $t = u32;
                $body
            }
            Tag::I64 => {
                type $t = i64;
                $body
            }
            Tag::U64 => {
                type $t = u64;
                $body
            }
            Tag::Generic => $generic,
        }
    };
}

impl Tag {
    /// All integer tags, narrowest first.
    pub const INTEGERS: [Tag; 8] = [
        Tag::I8,
        Tag::U8,
        Tag::I16,
        Tag::U16,
        Tag::I32,
        Tag::U32,
        Tag::I64,
        Tag::U64,
    ];

    /// The canonical element width in bytes, or zero for `Generic`.
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            Tag::I8 | Tag::U8 => 1,
            Tag::I16 | Tag::U16 => 2,
            Tag::I32 | Tag::U32 => 4,
            Tag::I64 | Tag::U64 => 8,
            Tag::Generic => 0,
        }
    }

    /// Check whether this tag denotes a signed integer type.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Tag::I8 | Tag::I16 | Tag::I32 | Tag::I64)
    }

    /// Check whether this tag denotes an integer type.
    #[inline]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Tag::Generic)
    }

    /// Narrow `value` to the native width and write it into `slot`.
    /// Truncation wraps. Nothing is written for `Generic`.
    ///
    /// # Panics
    /// If `slot` is shorter than the tag's width.
    #[inline]
    pub fn store_signed(self, slot: &mut [u8], value: i64) {
        dispatch!(self, T => T::from_signed(value).write(slot), _ => ())
    }

    /// Narrow `value` to the native width and write it into `slot`.
    /// Truncation wraps. Nothing is written for `Generic`.
    ///
    /// # Panics
    /// If `slot` is shorter than the tag's width.
    #[inline]
    pub fn store_unsigned(self, slot: &mut [u8], value: u64) {
        dispatch!(self, T => T::from_unsigned(value).write(slot), _ => ())
    }

    /// Read a native value from `slot` and widen it to an `i64`.
    /// `Generic` always yields zero without reading.
    ///
    /// # Panics
    /// If `slot` is shorter than the tag's width.
    #[inline]
    pub fn load_signed(self, slot: &[u8]) -> i64 {
        dispatch!(self, T => T::read(slot).to_signed(), _ => 0)
    }

    /// Read a native value from `slot` and widen it to a `u64`.
    /// `Generic` always yields zero without reading.
    ///
    /// # Panics
    /// If `slot` is shorter than the tag's width.
    #[inline]
    pub fn load_unsigned(self, slot: &[u8]) -> u64 {
        dispatch!(self, T => T::read(slot).to_unsigned(), _ => 0)
    }
}

mod sealed {
    pub trait Sealed {}
}

/// The fixed-width integer types which may be stored in a typed vector.
///
/// Widening sign-extends signed types and zero-extends unsigned types; the
/// resulting 64-bit pattern is then reinterpreted as `i64` or `u64`.
pub trait IntElement: Copy + Debug + Default + PartialEq + sealed::Sealed + 'static {
    /// The tag of vectors holding this type.
    const TAG: Tag;

    /// Narrow a canonical signed value, wrapping on overflow.
    fn from_signed(value: i64) -> Self;

    /// Narrow a canonical unsigned value, wrapping on overflow.
    fn from_unsigned(value: u64) -> Self;

    /// Widen to the canonical signed representation.
    fn to_signed(self) -> i64;

    /// Widen to the canonical unsigned representation.
    fn to_unsigned(self) -> u64;

    /// Read a value from the leading bytes of `slot` in native byte order.
    fn read(slot: &[u8]) -> Self;

    /// Write this value to the leading bytes of `slot` in native byte order.
    fn write(self, slot: &mut [u8]);
}

macro_rules! impl_int_element {
    ($($t:ty => $tag:ident via $wide:ty),+ $(,)?) => {
        $(
            impl sealed::Sealed for $t {}

            impl IntElement for $t {
                const TAG: Tag = Tag::$tag;

                #[inline]
                fn from_signed(value: i64) -> Self {
                    value as $t
                }

                #[inline]
                fn from_unsigned(value: u64) -> Self {
                    value as $t
                }

                #[inline]
                fn to_signed(self) -> i64 {
                    (self as $wide) as i64
                }

                #[inline]
                fn to_unsigned(self) -> u64 {
                    (self as $wide) as u64
                }

                #[inline]
                fn read(slot: &[u8]) -> Self {
                    let mut bytes = [0u8; size_of::<$t>()];
                    bytes.copy_from_slice(&slot[..size_of::<$t>()]);
                    <$t>::from_ne_bytes(bytes)
                }

                #[inline]
                fn write(self, slot: &mut [u8]) {
                    slot[..size_of::<$t>()].copy_from_slice(&self.to_ne_bytes());
                }
            }
        )+
    };
}

impl_int_element!(
    i8 => I8 via i64,
    u8 => U8 via u64,
    i16 => I16 via i64,
    u16 => U16 via u64,
    i32 => I32 via i64,
    u32 => U32 via u64,
    i64 => I64 via i64,
    u64 => U64 via u64,
);
