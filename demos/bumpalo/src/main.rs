use bumpalo::Bump;
use flex_svec::{byte_storage, SVec, Source, Tag};

fn main() {
    let bump = Bump::new();
    let mut vec: SVec<&Bump> =
        SVec::try_with_type_in(Tag::U32, 1, &bump).expect("bump allocation");
    vec.push_u(83);
    vec.cat(Source::This);
    assert_eq!(vec.iter_u().collect::<Vec<_>>(), [83, 83]);

    let mut buf = byte_storage::<256>();
    let mut fixed = SVec::over_buffer(Tag::U32, &mut buf);
    fixed.cat(&vec);
    assert_eq!(fixed, vec);
}
