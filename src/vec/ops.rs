//! Copy, append, erase and resize between vectors, including a vector and
//! itself.

use crate::alloc::Allocator;
#[cfg(feature = "alloc")]
use crate::alloc::Global;
use crate::error::StorageError;

use super::buffer::{VecHeader, VecRef};
use super::SVec;

/// The source operand of a vector mutation.
#[derive(Debug, Clone, Copy)]
pub enum Source<'s> {
    /// The destination vector itself.
    This,
    /// A distinct vector.
    Other(VecRef<'s>),
}

impl<'s, A: Allocator> From<&'s SVec<A>> for Source<'s> {
    #[inline]
    fn from(vec: &'s SVec<A>) -> Self {
        Source::Other(vec.view())
    }
}

impl<'s> From<VecRef<'s>> for Source<'s> {
    #[inline]
    fn from(view: VecRef<'s>) -> Self {
        Source::Other(view)
    }
}

impl<'s, A: Allocator> From<&'s SVec<A>> for VecRef<'s> {
    #[inline]
    fn from(vec: &'s SVec<A>) -> Self {
        vec.view()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Overwrite,
    Append,
}

impl<A: Allocator> SVec<A> {
    #[inline]
    fn compatible(&self, src: &VecRef<'_>) -> bool {
        match self.header() {
            Some(header) => src.tag == Some(header.tag) && src.width == header.width,
            None => false,
        }
    }

    #[inline]
    fn mismatch(&mut self, mode: Mode) -> Result<(), StorageError> {
        if mode == Mode::Overwrite {
            self.clear();
        }
        Err(StorageError::Incompatible)
    }

    #[inline]
    fn append_point(&self, mode: Mode) -> usize {
        match mode {
            Mode::Overwrite => 0,
            Mode::Append => self.len(),
        }
    }

    /// Replace the sentinel with an empty allocation typed after `template`.
    pub(super) fn materialize(
        &mut self,
        template: &VecRef<'_>,
        capacity: usize,
    ) -> Result<(), StorageError> {
        debug_assert!(self.is_sentinel());
        let Some(tag) = template.tag else {
            return Err(StorageError::Unsupported);
        };
        self.buffer
            .grow(VecHeader::new(tag, template.width, capacity, false), false)
    }

    /// Check that `src` may be written into this vector, allocating the
    /// sentinel after it. Returns `false` when there is nothing to do.
    fn prepare(&mut self, mode: Mode, src: &VecRef<'_>, count: usize) -> Result<bool, StorageError> {
        if self.is_sentinel() {
            if src.tag.is_none() {
                return Ok(false);
            }
            self.materialize(src, count)?;
        } else if !self.compatible(src) {
            self.mismatch(mode)?;
        }
        Ok(true)
    }

    /// Copy whole elements into the buffer at element index `at`.
    #[inline]
    pub(super) fn place(&mut self, at: usize, elems: &[u8]) {
        let start = at * self.width();
        self.buffer.data_mut()[start..start + elems.len()].copy_from_slice(elems);
    }

    /// Move `count` elements starting at `from` to start at `to`. The ranges
    /// may overlap.
    #[inline]
    fn move_within(&mut self, from: usize, count: usize, to: usize) {
        let width = self.width();
        self.buffer
            .data_mut()
            .copy_within(from * width..(from + count) * width, to * width);
    }

    fn assign(&mut self, mode: Mode, src: Source<'_>, count: usize) -> Result<(), StorageError> {
        let src = match src {
            Source::This => {
                let count = count.min(self.len());
                let at = self.append_point(mode);
                let out = at.checked_add(count).ok_or(StorageError::CapacityLimit)?;
                self.try_reserve(out)?;
                if at > 0 {
                    self.move_within(0, count, at);
                }
                self.set_length(out);
                return Ok(());
            }
            Source::Other(src) => src,
        };
        let count = count.min(src.len());
        if !self.prepare(mode, &src, count)? {
            return Ok(());
        }
        let at = self.append_point(mode);
        let out = at.checked_add(count).ok_or(StorageError::CapacityLimit)?;
        self.try_reserve(out)?;
        self.place(at, src.elements(0, count));
        self.set_length(out);
        Ok(())
    }

    fn assign_erase(
        &mut self,
        mode: Mode,
        src: Source<'_>,
        off: usize,
        n: usize,
    ) -> Result<(), StorageError> {
        let src = match src {
            Source::This => {
                self.erase(off, n);
                return Ok(());
            }
            Source::Other(src) => src,
        };
        let src_len = src.len();
        let off = off.min(src_len);
        let n = n.min(src_len - off);
        let tail = src_len - off - n;
        if !self.prepare(mode, &src, off + tail)? {
            return Ok(());
        }
        let at = self.append_point(mode);
        let out = at
            .checked_add(off + tail)
            .ok_or(StorageError::CapacityLimit)?;
        self.try_reserve(out)?;
        self.place(at, src.elements(0, off));
        self.place(at + off, src.elements(off + n, tail));
        self.set_length(out);
        Ok(())
    }

    /// Replace the contents with those of `src`.
    ///
    /// The sentinel is replaced by a copy of `src`. When the element types
    /// differ the vector is cleared.
    pub fn cpy<'s>(&mut self, src: impl Into<Source<'s>>) {
        let _ = self.try_cpy(src);
    }

    /// Try to replace the contents with those of `src`.
    pub fn try_cpy<'s>(&mut self, src: impl Into<Source<'s>>) -> Result<(), StorageError> {
        self.assign(Mode::Overwrite, src.into(), usize::MAX)
    }

    /// Append the contents of `src`. Passing [`Source::This`] duplicates the
    /// current contents at the end.
    ///
    /// The sentinel is replaced by a copy of `src`. When the element types
    /// differ the vector is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flex_svec::{SVec, Source};
    /// let mut v = SVec::from_ints(&[1i8, 2]);
    /// v.cat(Source::This);
    /// assert_eq!(v.as_bytes(), &[1, 2, 1, 2]);
    /// ```
    pub fn cat<'s>(&mut self, src: impl Into<Source<'s>>) {
        let _ = self.try_cat(src);
    }

    /// Try to append the contents of `src`.
    pub fn try_cat<'s>(&mut self, src: impl Into<Source<'s>>) -> Result<(), StorageError> {
        self.assign(Mode::Append, src.into(), usize::MAX)
    }

    /// Append several sources after a single reservation. Every
    /// [`Source::This`] entry refers to the contents before the call.
    pub fn cat_many(&mut self, sources: &[Source<'_>]) {
        let _ = self.try_cat_many(sources);
    }

    /// Try to append several sources after a single reservation.
    ///
    /// Sentinel sources are skipped. Sources of a different element type are
    /// skipped and reported by the first error returned. A failed
    /// reservation leaves the vector unchanged.
    pub fn try_cat_many(&mut self, sources: &[Source<'_>]) -> Result<(), StorageError> {
        if self.is_sentinel() {
            let template = sources.iter().find_map(|src| match src {
                Source::Other(view) if view.tag.is_some() => Some(*view),
                _ => None,
            });
            match template {
                Some(template) => self.materialize(&template, 0)?,
                None => return Ok(()),
            }
        }
        let base = self.len();
        let mut total = base;
        for src in sources {
            let count = match src {
                Source::This => base,
                Source::Other(view) if self.compatible(view) => view.len(),
                Source::Other(_) => 0,
            };
            total = total.checked_add(count).ok_or(StorageError::CapacityLimit)?;
        }
        self.try_reserve(total)?;
        let mut result = Ok(());
        for src in sources {
            let count = match src {
                Source::This => base,
                Source::Other(view) if view.tag.is_none() => continue,
                Source::Other(view) => view.len(),
            };
            let res = self.assign(Mode::Append, *src, count);
            if result.is_ok() {
                result = res;
            }
        }
        result
    }

    /// Remove up to `n` elements starting at `off`, shifting the remaining
    /// elements down. Offsets past the end are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flex_svec::SVec;
    /// let mut v = SVec::from_ints(&[1u8, 2, 3, 4, 5]);
    /// v.erase(1, 2);
    /// assert_eq!(v.as_bytes(), &[1, 4, 5]);
    /// ```
    pub fn erase(&mut self, off: usize, n: usize) {
        let len = self.len();
        if off >= len {
            return;
        }
        let n = n.min(len - off);
        if off + n < len {
            self.move_within(off + n, len - off - n, off);
        }
        self.set_length(len - n);
    }

    /// Replace the contents with those of `src`, omitting up to `n` elements
    /// at `off`.
    pub fn cpy_erase<'s>(&mut self, src: impl Into<Source<'s>>, off: usize, n: usize) {
        let _ = self.try_cpy_erase(src, off, n);
    }

    /// Try to replace the contents with those of `src`, omitting up to `n`
    /// elements at `off`.
    pub fn try_cpy_erase<'s>(
        &mut self,
        src: impl Into<Source<'s>>,
        off: usize,
        n: usize,
    ) -> Result<(), StorageError> {
        self.assign_erase(Mode::Overwrite, src.into(), off, n)
    }

    /// Append the contents of `src`, omitting up to `n` elements at `off`.
    /// With [`Source::This`] this erases in place.
    pub fn cat_erase<'s>(&mut self, src: impl Into<Source<'s>>, off: usize, n: usize) {
        let _ = self.try_cat_erase(src, off, n);
    }

    /// Try to append the contents of `src`, omitting up to `n` elements at `off`.
    pub fn try_cat_erase<'s>(
        &mut self,
        src: impl Into<Source<'s>>,
        off: usize,
        n: usize,
    ) -> Result<(), StorageError> {
        self.assign_erase(Mode::Append, src.into(), off, n)
    }

    /// Keep at most the first `n` elements.
    #[inline]
    pub fn resize(&mut self, n: usize) {
        self.truncate(n);
    }

    /// Replace the contents with the first `n` elements of `src`.
    pub fn cpy_resize<'s>(&mut self, src: impl Into<Source<'s>>, n: usize) {
        let _ = self.try_cpy_resize(src, n);
    }

    /// Try to replace the contents with the first `n` elements of `src`.
    pub fn try_cpy_resize<'s>(
        &mut self,
        src: impl Into<Source<'s>>,
        n: usize,
    ) -> Result<(), StorageError> {
        self.assign(Mode::Overwrite, src.into(), n)
    }

    /// Append the first `n` elements of `src`.
    pub fn cat_resize<'s>(&mut self, src: impl Into<Source<'s>>, n: usize) {
        let _ = self.try_cat_resize(src, n);
    }

    /// Try to append the first `n` elements of `src`.
    pub fn try_cat_resize<'s>(
        &mut self,
        src: impl Into<Source<'s>>,
        n: usize,
    ) -> Result<(), StorageError> {
        self.assign(Mode::Append, src.into(), n)
    }

    /// Try to duplicate the first `max` elements into a new vector which
    /// allocates in `alloc`.
    pub fn try_dup_in<B: Allocator>(&self, max: usize, alloc: B) -> Result<SVec<B>, StorageError> {
        if self.is_sentinel() {
            return Err(StorageError::Unsupported);
        }
        let mut dup = SVec::new_in(alloc);
        dup.try_cpy_resize(self, max)?;
        Ok(dup)
    }
}

#[cfg(feature = "alloc")]
impl<A: Allocator> SVec<A> {
    /// Duplicate this vector into a new global allocation. The sentinel
    /// duplicates to the sentinel, as does a failed allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use flex_svec::SVec;
    /// let v = SVec::from_ints(&[1i32, 2, 3]);
    /// let mut d = v.dup();
    /// d.push_i(4);
    /// assert_eq!(v.len(), 3);
    /// assert_eq!(d.len(), 4);
    /// ```
    pub fn dup(&self) -> SVec<Global> {
        self.dup_n(usize::MAX)
    }

    /// Duplicate the first `max` elements of this vector.
    pub fn dup_n(&self, max: usize) -> SVec<Global> {
        let mut dup = SVec::new();
        dup.cpy_resize(self, max);
        dup
    }

    /// Duplicate this vector, omitting up to `n` elements at `off`.
    pub fn dup_erase(&self, off: usize, n: usize) -> SVec<Global> {
        let mut dup = SVec::new();
        dup.cpy_erase(self, off, n);
        dup
    }

    /// Duplicate the first `n` elements of this vector.
    #[inline]
    pub fn dup_resize(&self, n: usize) -> SVec<Global> {
        self.dup_n(n)
    }
}
