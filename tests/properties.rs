#![cfg(feature = "alloc")]

use proptest::prelude::*;

use flex_svec::{SVec, Source, Tag};

#[derive(Debug, Clone)]
enum Op {
    Push(u16),
    Pop,
    Erase(usize, usize),
    CatSelf,
    CatResizeSelf(usize),
    CpyResizeSelf(usize),
    Resize(usize),
    Cat(Vec<u16>),
    Cpy(Vec<u16>),
    CatErase(Vec<u16>, usize, usize),
    CpyErase(Vec<u16>, usize, usize),
    CatMany(Vec<u16>),
    Shrink,
}

fn arb_values() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(any::<u16>(), 0..12)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u16>().prop_map(Op::Push),
        Just(Op::Pop),
        (0usize..20, 0usize..20).prop_map(|(off, n)| Op::Erase(off, n)),
        Just(Op::CatSelf),
        (0usize..20).prop_map(Op::CatResizeSelf),
        (0usize..20).prop_map(Op::CpyResizeSelf),
        (0usize..20).prop_map(Op::Resize),
        arb_values().prop_map(Op::Cat),
        arb_values().prop_map(Op::Cpy),
        (arb_values(), 0usize..20, 0usize..20).prop_map(|(v, off, n)| Op::CatErase(v, off, n)),
        (arb_values(), 0usize..20, 0usize..20).prop_map(|(v, off, n)| Op::CpyErase(v, off, n)),
        arb_values().prop_map(Op::CatMany),
        Just(Op::Shrink),
    ]
}

fn erased(values: &[u16], off: usize, n: usize) -> Vec<u16> {
    let off = off.min(values.len());
    let end = off.saturating_add(n).min(values.len());
    let mut out = values[..off].to_vec();
    out.extend_from_slice(&values[end..]);
    out
}

fn apply(vec: &mut SVec, model: &mut Vec<u16>, op: Op) {
    match op {
        Op::Push(value) => {
            assert!(vec.push_u(value as u64));
            model.push(value);
        }
        Op::Pop => {
            assert_eq!(vec.pop_u(), model.pop().unwrap_or(0) as u64);
        }
        Op::Erase(off, n) => {
            vec.erase(off, n);
            *model = erased(model, off, n);
        }
        Op::CatSelf => {
            vec.cat(Source::This);
            model.extend_from_within(..);
        }
        Op::CatResizeSelf(n) => {
            vec.cat_resize(Source::This, n);
            let n = n.min(model.len());
            model.extend_from_within(..n);
        }
        Op::CpyResizeSelf(n) => {
            vec.cpy_resize(Source::This, n);
            model.truncate(n);
        }
        Op::Resize(n) => {
            vec.resize(n);
            model.truncate(n);
        }
        Op::Cat(values) => {
            vec.cat(&SVec::from_ints(&values));
            model.extend_from_slice(&values);
        }
        Op::Cpy(values) => {
            vec.cpy(&SVec::from_ints(&values));
            *model = values;
        }
        Op::CatErase(values, off, n) => {
            vec.cat_erase(&SVec::from_ints(&values), off, n);
            model.extend(erased(&values, off, n));
        }
        Op::CpyErase(values, off, n) => {
            vec.cpy_erase(&SVec::from_ints(&values), off, n);
            *model = erased(&values, off, n);
        }
        Op::CatMany(values) => {
            let other = SVec::from_ints(&values);
            vec.cat_many(&[Source::This, Source::from(&other), Source::This]);
            let base = model.clone();
            model.extend_from_slice(&base);
            model.extend_from_slice(&values);
            model.extend_from_slice(&base);
        }
        Op::Shrink => {
            vec.shrink();
            assert_eq!(vec.capacity(), vec.len());
        }
    }
}

proptest! {
    #[test]
    fn engine_matches_model(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut vec = SVec::with_type(Tag::U16, 0);
        let mut model = Vec::new();
        for op in ops {
            apply(&mut vec, &mut model, op);
            prop_assert!(vec.len() <= vec.capacity());
            prop_assert_eq!(vec.len(), model.len());
            prop_assert!(vec.iter_u().eq(model.iter().map(|v| *v as u64)));
        }
    }

    #[test]
    fn find_matches_position(values in arb_values(), target in any::<u16>(), off in 0usize..16) {
        let vec = SVec::from_ints(&values);
        let expected = values
            .iter()
            .enumerate()
            .skip(off)
            .find(|(_, v)| **v == target)
            .map(|(i, _)| i);
        prop_assert_eq!(vec.find_u(off, target as u64), expected);
    }

    #[test]
    fn narrowing_wraps(value in any::<i64>()) {
        for tag in Tag::INTEGERS {
            let mut vec = SVec::with_type(tag, 0);
            prop_assert!(vec.push_i(value));
            let expected = match tag {
                Tag::I8 => value as i8 as i64,
                Tag::U8 => value as u8 as i64,
                Tag::I16 => value as i16 as i64,
                Tag::U16 => value as u16 as i64,
                Tag::I32 => value as i32 as i64,
                Tag::U32 => value as u32 as i64,
                _ => value,
            };
            prop_assert_eq!(vec.pop_i(), expected);
        }
    }
}
