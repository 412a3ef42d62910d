//! Error handling.

use core::alloc::{Layout, LayoutError};
use core::fmt;

/// An enumeration of error types raised by storage and vector operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// A memory allocation failed.
    AllocError(Layout),
    /// The limit of the current allocation was reached, or a size
    /// calculation overflowed.
    CapacityLimit,
    /// The source and destination vectors hold different element types.
    Incompatible,
    /// The provided layout was not allocatable.
    LayoutError(LayoutError),
    /// The requested operation is not supported for this vector.
    Unsupported,
}

impl StorageError {
    /// Generic description of this error.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllocError(_) => "Allocation error",
            Self::CapacityLimit => "Exceeded storage capacity limit",
            Self::Incompatible => "Incompatible element types",
            Self::LayoutError(_) => "Layout error",
            Self::Unsupported => "Unsupported",
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LayoutError> for StorageError {
    fn from(err: LayoutError) -> Self {
        Self::LayoutError(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}
