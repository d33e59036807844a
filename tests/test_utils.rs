//! Tests for utility functions and packed bit storage.

use proptest::prelude::*;
use unarysim::utils::{make_rng, percentile, seq_len, shuffle, MAX_BITWIDTH};
use unarysim::{BitField, UnaryError};

#[test]
fn test_seq_len_bounds() {
    assert_eq!(seq_len(1).unwrap(), 2);
    assert_eq!(seq_len(MAX_BITWIDTH).unwrap(), 1 << MAX_BITWIDTH);
    assert!(matches!(seq_len(0), Err(UnaryError::Configuration(_))));
}

#[test]
fn test_percentile_interpolates() {
    let v = [10.0, 0.0, 30.0, 20.0];
    assert_eq!(percentile(&v, 0.0).unwrap(), 0.0);
    assert_eq!(percentile(&v, 100.0).unwrap(), 30.0);
    // rank 0.25 * 3 = 0.75 between 0 and 10
    assert!((percentile(&v, 25.0).unwrap() - 7.5).abs() < 1e-12);
}

#[test]
fn test_percentile_errors() {
    assert!(matches!(percentile(&[], 50.0), Err(UnaryError::EmptyInput)));
    assert!(matches!(percentile(&[f64::NAN], 50.0), Err(UnaryError::NonFinite)));
    assert!(percentile(&[1.0], 101.0).is_err());
}

#[test]
fn test_shuffle_empty_and_single() {
    let mut rng = make_rng(Some(0));
    let mut empty: Vec<u32> = vec![];
    shuffle(&mut empty, &mut rng);
    assert!(empty.is_empty());

    let mut one = vec![7u32];
    shuffle(&mut one, &mut rng);
    assert_eq!(one, vec![7]);
}

#[test]
fn test_bitfield_from_bools() {
    let a: BitField = [true, false, true, true].into_iter().collect();
    assert_eq!(a.get_bits(), vec![1, 0, 1, 1]);
    assert_eq!(a.get_acts(), vec![0, 2, 3]);
    assert_eq!(a.num_set() + a.num_cleared(), 4);
    assert_eq!(a, BitField::from_fn(4, |i| i != 1));
}

proptest! {
    #[test]
    fn prop_shuffle_is_permutation(len in 0usize..512, seed in any::<u64>()) {
        let mut arr: Vec<u32> = (0..len as u32).collect();
        shuffle(&mut arr, &mut make_rng(Some(seed)));
        arr.sort_unstable();
        prop_assert_eq!(arr, (0..len as u32).collect::<Vec<u32>>());
    }

    #[test]
    fn prop_percentile_within_range(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..100), q in 0.0f64..=100.0) {
        let p = percentile(&values, q).unwrap();
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(p >= lo - 1e-6 && p <= hi + 1e-6);
    }

    #[test]
    fn prop_bitfield_counts(bits in prop::collection::vec(any::<bool>(), 0..300)) {
        let field: BitField = bits.iter().copied().collect();
        prop_assert_eq!(field.num_bits(), bits.len());
        prop_assert_eq!(field.num_set(), bits.iter().filter(|&&b| b).count());
    }
}
