//! Single-precision assignments run as flat scalar loops.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vml_dispatch::{
    assign, routing_table, ArrayMath, CwiseUnary, DispatchPath, ElementKind, MatrixXf, Router,
    RowMatrixXf, Strategy, UnaryOp, VectorXf,
};

#[test]
fn test_every_unary_op_matches_std_f32() {
    let mut rng = StdRng::seed_from_u64(12345);
    let src = VectorXf::from_fn(257, 1, |_, _| rng.random_range(0.05f32..=0.95));

    for op in UnaryOp::ALL {
        let mut dst = VectorXf::zeros(257, 1);
        let path = assign(&mut dst, &CwiseUnary::new(op, &src));

        assert_eq!(path, DispatchPath::ScalarFallback, "{}", op.name());
        for i in 0..257 {
            let expected = vml_dispatch::routing::scalar_unary(op, src[(i, 0)]);
            assert_eq!(dst[(i, 0)], expected, "{} i={i}", op.name());
        }
    }
}

#[test]
fn test_binary_ops_f32() {
    let a = VectorXf::from_fn(33, 1, |r, _| 1.0 + r as f32 * 0.25);
    let b = VectorXf::from_fn(33, 1, |r, _| 0.5 + r as f32 * 0.125);
    let mut sum = VectorXf::zeros(33, 1);
    let mut pow = VectorXf::zeros(33, 1);

    assert_eq!(assign(&mut sum, &a.plus(&b)), DispatchPath::ScalarFallback);
    assert_eq!(assign(&mut pow, &a.pow(&b)), DispatchPath::ScalarFallback);

    for i in 0..33 {
        assert_eq!(sum[(i, 0)], a[(i, 0)] + b[(i, 0)]);
        assert_eq!(pow[(i, 0)], a[(i, 0)].powf(b[(i, 0)]));
    }
}

#[test]
fn test_ineligible_f32_takes_generic_path() {
    let src = RowMatrixXf::from_fn(8, 8, |r, c| (r * 8 + c) as f32);
    let mut dst = MatrixXf::zeros(8, 8);

    assert_eq!(assign(&mut dst, &src.sqrt()), DispatchPath::Generic);
    assert_eq!(dst[(7, 7)], 63f32.sqrt());
}

#[test]
fn test_routing_table_never_routes_f32_to_native() {
    for entry in routing_table().filter(|e| e.element_type == ElementKind::Float32) {
        assert_eq!(entry.strategy, Strategy::ScalarFallback, "{}", entry.operation);
    }
    assert_eq!(
        Router::<vml_dispatch::Linked>::unary_strategy::<VectorXf, VectorXf>(UnaryOp::Exp),
        Strategy::ScalarFallback
    );
}
