//! Routing table from (operation, element type) to an execution strategy.
//!
//! Every supported operation is one row of data: its name, the native symbol
//! it binds to, the native routine itself and the scalar reference used for
//! remainders and fallbacks. The router never branches on individual
//! operations; it looks up a row and runs the strategy [`select`] picks.
//!
//! # Strategies
//!
//! | Element | Eligible | Strategy |
//! |---------|----------|----------|
//! | `f64`   | yes      | [`Strategy::VectorizedCall`] |
//! | `f32`   | yes      | [`Strategy::ScalarFallback`] |
//! | any     | no       | [`Strategy::Unspecialized`] |
//!
//! Single precision never reaches a native routine: no native `f32` entry
//! points are wired, so eligible `f32` assignments run a flat scalar loop
//! over the extracted buffers.

use std::fmt;

use num::Float;

use crate::native::{self, BinaryRoutine, UnaryRoutine};
use crate::operand::ElementKind;

/// Coefficient-wise unary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Exp,
    Sin,
    Cos,
    Sqrt,
    Log,
    Log10,
    Asin,
    Sinh,
    Acos,
    Cosh,
    Tan,
    Atan,
    Tanh,
    Log2,
}

/// Coefficient-wise binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Sum,
    Pow,
}

impl UnaryOp {
    /// All unary operations, in routing table order.
    pub const ALL: [UnaryOp; 14] = [
        UnaryOp::Exp,
        UnaryOp::Sin,
        UnaryOp::Cos,
        UnaryOp::Sqrt,
        UnaryOp::Log,
        UnaryOp::Log10,
        UnaryOp::Asin,
        UnaryOp::Sinh,
        UnaryOp::Acos,
        UnaryOp::Cosh,
        UnaryOp::Tan,
        UnaryOp::Atan,
        UnaryOp::Tanh,
        UnaryOp::Log2,
    ];

    pub fn route(self) -> &'static UnaryRoute {
        &UNARY_ROUTES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.route().name
    }
}

impl BinaryOp {
    /// All binary operations, in routing table order.
    pub const ALL: [BinaryOp; 2] = [BinaryOp::Sum, BinaryOp::Pow];

    pub fn route(self) -> &'static BinaryRoute {
        &BINARY_ROUTES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.route().name
    }
}

/// Either kind of operation, for table listings and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Unary(op) => op.name(),
            Operation::Binary(op) => op.name(),
        }
    }

    pub fn native_symbol(self) -> &'static str {
        match self {
            Operation::Unary(op) => op.route().native_symbol,
            Operation::Binary(op) => op.route().native_symbol,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the unary routing table.
#[derive(Debug)]
pub struct UnaryRoute {
    pub op: UnaryOp,
    pub name: &'static str,
    pub native_symbol: &'static str,
    pub native: UnaryRoutine,
    pub scalar: fn(f64) -> f64,
}

/// One row of the binary routing table.
#[derive(Debug)]
pub struct BinaryRoute {
    pub op: BinaryOp,
    pub name: &'static str,
    pub native_symbol: &'static str,
    pub native: BinaryRoutine,
    pub scalar: fn(f64, f64) -> f64,
}

macro_rules! unary_routes {
    ($($op:ident => $name:literal, $symbol:literal, $native:path, $scalar:path;)*) => {
        /// Unary routing table, indexed by `UnaryOp as usize`.
        pub static UNARY_ROUTES: [UnaryRoute; 14] = [
            $(UnaryRoute {
                op: UnaryOp::$op,
                name: $name,
                native_symbol: $symbol,
                native: $native,
                scalar: $scalar,
            },)*
        ];
    };
}

unary_routes! {
    Exp => "exp", "amd_vrda_exp", native::exp, f64::exp;
    Sin => "sin", "amd_vrda_sin", native::sin, f64::sin;
    Cos => "cos", "amd_vrda_cos", native::cos, f64::cos;
    Sqrt => "sqrt", "amd_vrda_sqrt", native::sqrt, f64::sqrt;
    Log => "log", "amd_vrda_log", native::log, f64::ln;
    Log10 => "log10", "amd_vrda_log10", native::log10, f64::log10;
    Asin => "asin", "amd_vrda_asin", native::asin, f64::asin;
    Sinh => "sinh", "amd_vrda_sinh", native::sinh, f64::sinh;
    Acos => "acos", "amd_vrda_acos", native::acos, f64::acos;
    Cosh => "cosh", "amd_vrda_cosh", native::cosh, f64::cosh;
    Tan => "tan", "amd_vrda_tan", native::tan, f64::tan;
    Atan => "atan", "amd_vrda_atan", native::atan, f64::atan;
    Tanh => "tanh", "amd_vrda_tanh", native::tanh, f64::tanh;
    Log2 => "log2", "amd_vrda_log2", native::log2, f64::log2;
}

fn add_f64(lhs: f64, rhs: f64) -> f64 {
    lhs + rhs
}

/// Binary routing table, indexed by `BinaryOp as usize`.
pub static BINARY_ROUTES: [BinaryRoute; 2] = [
    BinaryRoute {
        op: BinaryOp::Sum,
        name: "sum",
        native_symbol: "amd_vrda_add",
        native: native::add,
        scalar: add_f64,
    },
    BinaryRoute {
        op: BinaryOp::Pow,
        name: "pow",
        native_symbol: "amd_vrda_pow",
        native: native::pow,
        scalar: f64::powf,
    },
];

/// How an assignment is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Call the named native routine over the extracted buffers.
    VectorizedCall(&'static str),
    /// Flat scalar loop over the extracted buffers.
    ScalarFallback,
    /// Not specialized: the host's coefficient-wise generic path runs.
    Unspecialized,
}

/// One (operation, element type) row of the routing table, for eligible
/// operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingTableEntry {
    pub operation: Operation,
    pub element_type: ElementKind,
    pub strategy: Strategy,
}

/// Picks the execution strategy for an operation.
///
/// `eligible` is the eligibility evaluator's verdict for the concrete
/// destination/source types; an ineligible combination is never specialized.
pub fn select(operation: Operation, element_type: ElementKind, eligible: bool) -> Strategy {
    if !eligible {
        return Strategy::Unspecialized;
    }

    match element_type {
        ElementKind::Float64 => Strategy::VectorizedCall(operation.native_symbol()),
        ElementKind::Float32 => Strategy::ScalarFallback,
    }
}

/// The full routing table for eligible operands: every operation crossed
/// with every element type.
pub fn routing_table() -> impl Iterator<Item = RoutingTableEntry> {
    let operations = UnaryOp::ALL
        .into_iter()
        .map(Operation::Unary)
        .chain(BinaryOp::ALL.into_iter().map(Operation::Binary));

    operations.flat_map(|operation| {
        ElementKind::ALL
            .into_iter()
            .map(move |element_type| RoutingTableEntry {
                operation,
                element_type,
                strategy: select(operation, element_type, true),
            })
    })
}

/// Scalar evaluation of a unary operation for any float type.
#[inline(always)]
pub fn scalar_unary<T: Float>(op: UnaryOp, x: T) -> T {
    match op {
        UnaryOp::Exp => x.exp(),
        UnaryOp::Sin => x.sin(),
        UnaryOp::Cos => x.cos(),
        UnaryOp::Sqrt => x.sqrt(),
        UnaryOp::Log => x.ln(),
        UnaryOp::Log10 => x.log10(),
        UnaryOp::Asin => x.asin(),
        UnaryOp::Sinh => x.sinh(),
        UnaryOp::Acos => x.acos(),
        UnaryOp::Cosh => x.cosh(),
        UnaryOp::Tan => x.tan(),
        UnaryOp::Atan => x.atan(),
        UnaryOp::Tanh => x.tanh(),
        UnaryOp::Log2 => x.log2(),
    }
}

/// Scalar evaluation of a binary operation for any float type.
#[inline(always)]
pub fn scalar_binary<T: Float>(op: BinaryOp, lhs: T, rhs: T) -> T {
    match op {
        BinaryOp::Sum => lhs + rhs,
        BinaryOp::Pow => lhs.powf(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_indexed_by_discriminant() {
        for op in UnaryOp::ALL {
            assert_eq!(op.route().op, op);
        }
        for op in BinaryOp::ALL {
            assert_eq!(op.route().op, op);
        }
    }

    #[test]
    fn test_native_symbols_are_unique() {
        let mut symbols: Vec<&str> = UNARY_ROUTES
            .iter()
            .map(|r| r.native_symbol)
            .chain(BINARY_ROUTES.iter().map(|r| r.native_symbol))
            .collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), 16);
    }

    #[test]
    fn test_select() {
        let exp = Operation::Unary(UnaryOp::Exp);
        assert_eq!(
            select(exp, ElementKind::Float64, true),
            Strategy::VectorizedCall("amd_vrda_exp")
        );
        assert_eq!(
            select(exp, ElementKind::Float32, true),
            Strategy::ScalarFallback
        );
        assert_eq!(
            select(exp, ElementKind::Float64, false),
            Strategy::Unspecialized
        );
        assert_eq!(
            select(Operation::Binary(BinaryOp::Pow), ElementKind::Float32, false),
            Strategy::Unspecialized
        );
    }

    #[test]
    fn test_routing_table_is_closed() {
        let table: Vec<_> = routing_table().collect();
        assert_eq!(table.len(), 32);
        assert!(table
            .iter()
            .filter(|e| e.element_type == ElementKind::Float32)
            .all(|e| e.strategy == Strategy::ScalarFallback));
        assert!(table
            .iter()
            .filter(|e| e.element_type == ElementKind::Float64)
            .all(|e| matches!(e.strategy, Strategy::VectorizedCall(_))));
    }

    #[test]
    fn test_scalar_reference_matches_generic_scalar() {
        let x = 0.37f64;
        for op in UnaryOp::ALL {
            assert_eq!((op.route().scalar)(x), scalar_unary(op, x), "{}", op.name());
        }
        assert_eq!((BinaryOp::Sum.route().scalar)(1.5, 2.25), 3.75);
        assert_eq!((BinaryOp::Pow.route().scalar)(2.0, 10.0), 1024.0);
    }

    #[test]
    fn test_log_is_natural() {
        let e = std::f64::consts::E;
        assert!((scalar_unary(UnaryOp::Log, e) - 1.0).abs() < 1e-15);
        assert_eq!(UnaryOp::Log.name(), "log");
    }
}
