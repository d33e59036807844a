//! Tests for RawScale.
//!
//! Tests cover:
//! - Output bounds for both polarities
//! - Percentile clipping of outliers
//! - Degenerate and invalid input handling

use approx::assert_abs_diff_eq;
use ndarray::{array, Array, ArrayD, IxDyn};
use proptest::prelude::*;
use unarysim::stream::{Polarity, RawScale};
use unarysim::UnaryError;

fn extremes(a: &ArrayD<f64>) -> (f64, f64) {
    a.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)))
}

#[test]
fn test_unipolar_spans_unit_interval() {
    let raw = array![[0.3, -1.2, 4.1], [2.2, 0.0, -0.7]];
    let scaled = RawScale::new(&raw, Polarity::Unipolar, 100.0)
        .unwrap()
        .forward()
        .unwrap();
    let (lo, hi) = extremes(scaled.values());
    assert_abs_diff_eq!(lo, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(hi, 1.0, epsilon = 1e-12);
    assert_eq!(scaled.values().shape(), &[2, 3]);
}

#[test]
fn test_bipolar_spans_signed_interval() {
    let raw = array![5.0, 6.0, 7.0, 8.0, 9.0];
    let scaled = RawScale::new(&raw, Polarity::Bipolar, 100.0)
        .unwrap()
        .forward()
        .unwrap();
    let v = scaled.values();
    assert_abs_diff_eq!(v[[0]], -1.0);
    assert_abs_diff_eq!(v[[2]], 0.0);
    assert_abs_diff_eq!(v[[4]], 1.0);
    assert_eq!(scaled.polarity(), Polarity::Bipolar);
}

#[test]
fn test_outliers_are_clipped() {
    // One large outlier; a 98% window clips it to the 99th percentile
    let mut data: Vec<f64> = (0..100).map(f64::from).collect();
    data.push(1.0e6);
    let raw = Array::from_shape_vec(IxDyn(&[101]), data).unwrap();

    let scaler = RawScale::new(&raw, Polarity::Unipolar, 98.0).unwrap();
    assert!(scaler.clamp_max() < 1.0e6);
    assert_abs_diff_eq!(scaler.clamped()[[100]], scaler.clamp_max());

    let scaled = scaler.forward().unwrap();
    // The outlier lands on 1.0 and ordinary points keep their spread
    assert_abs_diff_eq!(scaled.values()[[100]], 1.0, epsilon = 1e-12);
    assert!(scaled.values()[[50]] > 0.4 && scaled.values()[[50]] < 0.6);
}

#[test]
fn test_constant_input_fails() {
    let raw = array![[2.5, 2.5], [2.5, 2.5]];
    let scaler = RawScale::new(&raw, Polarity::Bipolar, 100.0).unwrap();
    assert!(matches!(
        scaler.forward(),
        Err(UnaryError::DegenerateInput { .. })
    ));
}

#[test]
fn test_narrow_window_can_be_degenerate() {
    // Mostly constant data with a tiny window collapses both bounds
    let raw = array![0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0];
    let scaler = RawScale::new(&raw, Polarity::Unipolar, 10.0).unwrap();
    assert!(matches!(
        scaler.forward(),
        Err(UnaryError::DegenerateInput { .. })
    ));
}

#[test]
fn test_non_finite_and_empty_input() {
    assert!(matches!(
        RawScale::new(&array![1.0, f64::INFINITY], Polarity::Unipolar, 100.0),
        Err(UnaryError::NonFinite)
    ));
    let empty = ArrayD::<f64>::zeros(IxDyn(&[0]));
    assert!(matches!(
        RawScale::new(&empty, Polarity::Unipolar, 100.0),
        Err(UnaryError::EmptyInput)
    ));
}

#[test]
fn test_raw_input_is_not_modified() {
    let raw = array![-10.0, 0.0, 10.0];
    let before = raw.clone();
    let _ = RawScale::new(&raw, Polarity::Unipolar, 50.0).unwrap().forward().unwrap();
    assert_eq!(raw, before);
}

proptest! {
    #[test]
    fn prop_unipolar_bounds(data in prop::collection::vec(-1.0e3f64..1.0e3, 2..64)) {
        prop_assume!(data.iter().any(|&x| x != data[0]));
        let raw = Array::from_shape_vec(IxDyn(&[data.len()]), data).unwrap();
        let scaled = RawScale::new(&raw, Polarity::Unipolar, 100.0).unwrap().forward().unwrap();
        let (lo, hi) = extremes(scaled.values());
        prop_assert!((lo - 0.0).abs() < 1e-9);
        prop_assert!((hi - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_bipolar_within_bounds(data in prop::collection::vec(-1.0e3f64..1.0e3, 2..64), pct in 1.0f64..=100.0) {
        let raw = Array::from_shape_vec(IxDyn(&[data.len()]), data).unwrap();
        let scaler = RawScale::new(&raw, Polarity::Bipolar, pct).unwrap();
        if let Ok(scaled) = scaler.forward() {
            prop_assert!(scaled.values().iter().all(|&x| (-1.0 - 1e-9..=1.0 + 1e-9).contains(&x)));
        }
    }
}
