//! Binary assignments: coefficient-wise sum and power.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vml_dispatch::{
    assign, try_assign, ArrayMath, BinaryOp, CwiseBinary, DispatchError, DispatchPath, MatrixXd,
    RowMatrixXd, RowVectorXd, VectorXd,
};

#[test]
fn test_sum_is_exact() {
    let mut rng = StdRng::seed_from_u64(12345);

    for n in [1, 8, 10, 16, 17, 1000] {
        let a = VectorXd::from_fn(n, 1, |_, _| rng.random_range(-100.0..=100.0));
        let b = VectorXd::from_fn(n, 1, |_, _| rng.random_range(-100.0..=100.0));
        let mut c = VectorXd::zeros(n, 1);

        assert_eq!(assign(&mut c, &a.plus(&b)), DispatchPath::Vectorized);
        for i in 0..n {
            assert_eq!(c[(i, 0)], a[(i, 0)] + b[(i, 0)], "n={n} i={i}");
        }
    }
}

#[test]
fn test_add_operator_builds_a_sum() {
    let a = VectorXd::from_column(vec![1.0, 2.0, 3.0, 4.0]);
    let b = VectorXd::from_column(vec![1.0, 2.0, 3.0, 4.0]);
    let mut c = VectorXd::zeros(4, 1);

    assign(&mut c, &(&a + &b));

    assert_eq!(c.as_slice(), &[2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn test_pow_matches_powf() {
    let mut rng = StdRng::seed_from_u64(42);

    for n in [1, 8, 10, 16, 17, 300] {
        let base = VectorXd::from_fn(n, 1, |_, _| rng.random_range(0.1..=10.0));
        let exponent = VectorXd::from_fn(n, 1, |_, _| rng.random_range(-3.0..=3.0));
        let mut out = VectorXd::zeros(n, 1);

        assign(&mut out, &base.pow(&exponent));

        for i in 0..n {
            let expected = base[(i, 0)].powf(exponent[(i, 0)]);
            let relative_error = ((out[(i, 0)] - expected) / expected).abs();
            assert!(
                relative_error < 1e-13,
                "n={n} i={i}: expected={expected}, actual={}, rel_error={relative_error:.2e}",
                out[(i, 0)]
            );
        }
    }
}

#[test]
fn test_pow_known_values() {
    let base = VectorXd::from_column(vec![2.0, 3.0, 4.0, 9.0]);
    let exponent = VectorXd::from_column(vec![10.0, 2.0, 0.5, 0.5]);
    let mut out = VectorXd::zeros(4, 1);

    assign(&mut out, &CwiseBinary::new(BinaryOp::Pow, &base, &exponent));

    assert_eq!(out.as_slice(), &[1024.0, 9.0, 2.0, 3.0]);
}

#[test]
fn test_row_major_operands() {
    let a = RowMatrixXd::from_fn(5, 30, |r, c| (r * 30 + c) as f64);
    let b = RowMatrixXd::from_fn(5, 30, |r, c| (r + c) as f64);
    let mut c = RowMatrixXd::zeros(5, 30);

    assert_eq!(assign(&mut c, &a.plus(&b)), DispatchPath::Vectorized);
    assert_eq!(c[(4, 29)], (4 * 30 + 29 + 4 + 29) as f64);
}

#[test]
fn test_any_mismatched_storage_order_is_generic() {
    let col = MatrixXd::from_fn(4, 4, |r, c| (r * 4 + c) as f64);
    let row = RowMatrixXd::from_fn(4, 4, |r, c| (r * 4 + c) as f64);
    let mut dst = MatrixXd::zeros(4, 4);

    assert_eq!(assign(&mut dst, &col.plus(&row)), DispatchPath::Generic);
    for r in 0..4 {
        for c in 0..4 {
            assert_eq!(dst[(r, c)], 2.0 * (r * 4 + c) as f64);
        }
    }
}

#[test]
fn test_row_vector() {
    let a = RowVectorXd::from_row(vec![0.5; 20]);
    let mut c = RowVectorXd::zeros(1, 20);

    assign(&mut c, &a.pow(&a));

    assert!(c.as_slice().iter().all(|&x| x == 0.5f64.powf(0.5)));
}

#[test]
fn test_mismatched_operand_is_reported() {
    let a = VectorXd::zeros(8, 1);
    let b = VectorXd::zeros(9, 1);
    let mut c = VectorXd::zeros(8, 1);

    let err = try_assign(&mut c, &a.plus(&b)).unwrap_err();
    assert_eq!(
        err,
        DispatchError::ShapeMismatch {
            dst_rows: 8,
            dst_cols: 1,
            src_rows: 9,
            src_cols: 1
        }
    );
}
