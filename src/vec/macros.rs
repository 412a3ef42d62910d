/// Creates an [`SVec`](crate::SVec) with the given element type containing
/// the arguments, narrowed to the element type.
///
/// `svec![Tag::I32]` allocates an empty vector; `svec![Tag::U8; 1, 2, 3]`
/// fills it with values. Values are passed as `i64` for signed tags and as
/// `u64` for unsigned tags. A `Generic` tag produces the sentinel.
///
/// # Examples
///
/// ```
/// # use flex_svec::{svec, Tag};
/// let v = svec![Tag::I16; -1, 2, 70000];
/// assert_eq!(v.len(), 3);
/// assert_eq!(v.at_i(2), 4464);
/// ```
#[cfg(feature = "alloc")]
#[macro_export]
macro_rules! svec {
    ($tag:expr $(;)?) => (
        $crate::SVec::with_type($tag, 0)
    );
    ($tag:expr; $($x:expr),+ $(,)?) => ({
        let tag: $crate::Tag = $tag;
        let values = [$($x),+];
        let mut vec = $crate::SVec::with_type(tag, values.len());
        if tag.is_signed() {
            for value in values {
                vec.push_i(value as i64);
            }
        } else {
            for value in values {
                vec.push_u(value as u64);
            }
        }
        vec
    });
}
