use crate::alloc::Allocator;
use crate::error::StorageError;
use crate::tag::Tag;

use super::SVec;

impl<A: Allocator> SVec<A> {
    /// Append the raw elements in `elems`, whose length must be a non-zero
    /// multiple of the element width. Returns `false` without changing the
    /// vector when the input is malformed, the vector is the sentinel, or
    /// growth fails.
    pub fn push_raw(&mut self, elems: &[u8]) -> bool {
        self.try_push_raw(elems).is_ok()
    }

    /// Try to append the raw elements in `elems`.
    pub fn try_push_raw(&mut self, elems: &[u8]) -> Result<(), StorageError> {
        let width = self.width();
        if width == 0 || elems.is_empty() || elems.len() % width != 0 {
            return Err(StorageError::Unsupported);
        }
        let len = self.len();
        let Some(out) = len.checked_add(elems.len() / width) else {
            return Err(StorageError::CapacityLimit);
        };
        self.try_reserve(out)?;
        self.place(len, elems);
        self.set_length(out);
        Ok(())
    }

    /// Append a signed value narrowed to the element type. Generic vectors
    /// and the sentinel reject typed values.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flex_svec::{SVec, Tag};
    /// let mut v = SVec::with_type(Tag::I8, 0);
    /// assert!(v.push_i(300));
    /// assert_eq!(v.at_i(0), 44);
    /// ```
    pub fn push_i(&mut self, value: i64) -> bool {
        self.try_push_i(value).is_ok()
    }

    /// Try to append a signed value narrowed to the element type.
    #[inline]
    pub fn try_push_i(&mut self, value: i64) -> Result<(), StorageError> {
        self.push_with(|tag, slot| tag.store_signed(slot, value))
    }

    /// Append an unsigned value narrowed to the element type.
    pub fn push_u(&mut self, value: u64) -> bool {
        self.try_push_u(value).is_ok()
    }

    /// Try to append an unsigned value narrowed to the element type.
    #[inline]
    pub fn try_push_u(&mut self, value: u64) -> Result<(), StorageError> {
        self.push_with(|tag, slot| tag.store_unsigned(slot, value))
    }

    fn push_with(&mut self, store: impl FnOnce(Tag, &mut [u8])) -> Result<(), StorageError> {
        let Some(tag) = self.tag().filter(|tag| tag.is_integer()) else {
            return Err(StorageError::Unsupported);
        };
        let len = self.len();
        self.try_reserve(len + 1)?;
        let width = tag.width();
        store(tag, &mut self.buffer.data_mut()[len * width..(len + 1) * width]);
        self.set_length(len + 1);
        Ok(())
    }

    /// Append each raw element group in turn after growing once for all of
    /// them. Returns the number of groups appended.
    pub fn push_many(&mut self, elems: &[&[u8]]) -> usize {
        let width = self.width();
        if width > 0 {
            let total = elems.iter().map(|e| e.len() / width).sum();
            let _ = self.try_grow(total);
        }
        elems.iter().filter(|e| self.push_raw(e)).count()
    }

    /// Append signed values after growing once for all of them. Each value
    /// is pushed in turn, and the number of values appended is returned.
    pub fn push_many_i(&mut self, values: &[i64]) -> usize {
        let _ = self.try_grow(values.len());
        values.iter().filter(|v| self.push_i(**v)).count()
    }

    /// Append unsigned values after growing once for all of them. Each
    /// value is pushed in turn, and the number of values appended is
    /// returned.
    pub fn push_many_u(&mut self, values: &[u64]) -> usize {
        let _ = self.try_grow(values.len());
        values.iter().filter(|v| self.push_u(**v)).count()
    }

    /// Remove the last element, returning its bytes.
    pub fn pop(&mut self) -> Option<&[u8]> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.set_length(len - 1);
        let width = self.width();
        Some(&self.buffer.data()[(len - 1) * width..len * width])
    }

    /// Remove the last element, returning it widened to an `i64`. Returns
    /// zero when the vector is empty or not an integer vector.
    pub fn pop_i(&mut self) -> i64 {
        let tag = self.tag();
        match (tag, self.pop()) {
            (Some(tag), Some(slot)) => tag.load_signed(slot),
            _ => 0,
        }
    }

    /// Remove the last element, returning it widened to a `u64`. Returns
    /// zero when the vector is empty or not an integer vector.
    pub fn pop_u(&mut self) -> u64 {
        let tag = self.tag();
        match (tag, self.pop()) {
            (Some(tag), Some(slot)) => tag.load_unsigned(slot),
            _ => 0,
        }
    }
}
