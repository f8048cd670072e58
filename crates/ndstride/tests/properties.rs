// Property tests for layout arithmetic, slicing and expressions

use ndstride::prelude::*;
use ndstride::{normalize, row_major_strides, Index};
use proptest::prelude::*;

fn shape3() -> impl Strategy<Value = [usize; 3]> {
    prop::array::uniform3(1usize..6)
}

/// Picks an inclusive window `[first, last]` inside `0..len` from two seeds.
fn window(len: usize, a: usize, b: usize) -> (usize, usize) {
    let first = a % len;
    let last = first + b % (len - first);
    (first, last)
}

proptest! {
    #[test]
    fn prop_default_strides_are_row_major(shape in shape3()) {
        let strides = row_major_strides(&shape);
        prop_assert_eq!(strides[2], 1);
        prop_assert_eq!(strides[1], shape[2] as isize);
        prop_assert_eq!(strides[0], (shape[1] * shape[2]) as isize);
    }

    #[test]
    fn prop_get_reads_linear_offset(shape in shape3(), seeds in prop::array::uniform3(0usize..64)) {
        let len = shape.iter().product::<usize>();
        let view = NdSlice::new(iota(len)?, shape)?;
        let index = [seeds[0] % shape[0], seeds[1] % shape[1], seeds[2] % shape[2]];
        let expected: isize = index
            .iter()
            .zip(view.strides())
            .map(|(&i, &s)| i as isize * s)
            .sum();
        prop_assert_eq!(view.get(index.map(|i| i as isize)), expected as usize);
    }

    #[test]
    fn prop_negative_index_counts_from_end(len in 1usize..1000, k in 1usize..1000) {
        prop_assume!(k <= len);
        prop_assert_eq!(normalize(-(k as isize), len), len - k);
        prop_assert_eq!(Index::from(End).normalize(len), len - 1);
    }

    #[test]
    fn prop_full_slice_is_identity(shape in shape3()) {
        let len = shape.iter().product::<usize>();
        let view = NdSlice::new(iota(len)?, shape)?;
        let same: NdSlice<_, 3> = view.slice(s![.., .., ..])?;
        prop_assert_eq!(same.shape(), view.shape());
        prop_assert_eq!(same.strides(), view.strides());
        prop_assert_eq!(same.to_vec(), view.to_vec());
    }

    #[test]
    fn prop_point_drops_axis_range_keeps_it(
        shape in shape3(),
        point in 0usize..64,
        a in 0usize..64,
        b in 0usize..64,
    ) {
        let len = shape.iter().product::<usize>();
        let view = NdSlice::new(iota(len)?, shape)?;
        let p = point % shape[0];
        let (first, last) = window(shape[2], a, b);
        let sub: NdSlice<_, 2> = view.slice(s![p, .., [first, last]])?;
        prop_assert_eq!(sub.shape(), &[shape[1], last - first + 1]);
        prop_assert_eq!(sub.strides(), &[view.strides()[1], view.strides()[2]]);
        for j in 0..shape[1] {
            for k in 0..=(last - first) {
                prop_assert_eq!(
                    sub.get([j as isize, k as isize]),
                    view.get([p as isize, j as isize, (first + k) as isize])
                );
            }
        }
    }

    #[test]
    fn prop_expression_matches_elementwise(
        data in prop::collection::vec(-1000i64..1000, 12),
        other in prop::collection::vec(1i64..1000, 12),
    ) {
        let a = NdArray::from_vec(data.clone(), [3, 4])?;
        let b = NdArray::from_vec(other.clone(), [3, 4])?;
        let e = (&a + &b) * &a - &b / &b;
        let out = e.eval()?;
        for (flat, value) in out.iter().enumerate() {
            let (x, y) = (data[flat], other[flat]);
            prop_assert_eq!(value, (x + y) * x - y / y);
        }
        // Reading twice gives the same answer.
        prop_assert_eq!(e.get([2, 3]), out.get([2, 3]));
    }
}
