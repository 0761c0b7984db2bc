//! Per-operator rule tables.
//!
//! Every operator has one `static` [`RuleSet`], sorted by ascending order.
//! The numeric part of every table follows the same layout:
//!
//! | order | guard |
//! |------:|-------|
//! | 0–4 | operator-specific fixed-width fast paths |
//! | 5 | SmallInt × SmallInt (fixed width, may cede on overflow) |
//! | 6–8 | integer promotion pairs, then Integer × Integer |
//! | 10–14 | float pairs and their integer promotions |
//! | 20–24 | complex pairs and their promotions |
//! | 30–59 | operator-specific rules (strings, sequences) |
//! | 200 | either operand a guest object → protocol dispatch |
//! | 1000 | catch-all → unsupported operands |

use num_bigint::BigInt;
use num_complex::Complex64;

use crate::convert;
use crate::error::{NodeError, RuleResult};
use crate::kind::Kind;
use crate::op::BinaryOp;
use crate::rule::RuleSet;
use crate::value::Value;

/// Order of the protocol-dispatch rule in every table
pub const PROTOCOL_ORDER: u16 = 200;
/// Order of the catch-all rule in every table
pub const UNSUPPORTED_ORDER: u16 = 1000;

/// The rule table of an operator
pub fn for_op(op: BinaryOp) -> &'static RuleSet {
    match op {
        BinaryOp::Add => &ADD,
        BinaryOp::Sub => &SUB,
        BinaryOp::Mul => &MUL,
        BinaryOp::TrueDiv => &TRUE_DIV,
        BinaryOp::FloorDiv => &FLOOR_DIV,
        BinaryOp::Mod => &MOD,
        BinaryOp::Pow => &POW,
    }
}

// ========== Operand extraction ==========
//
// Guards have already checked the kinds; these only fail if a table row
// pairs a guard with the wrong compute function.

fn mismatch(l: &Value, r: &Value) -> NodeError {
    NodeError::type_error(format!(
        "rule applied to unexpected operands {} and {}",
        Kind::of(l),
        Kind::of(r)
    ))
}

pub(crate) fn small_operands(l: &Value, r: &Value) -> RuleResult<(i32, i32)> {
    match (l, r) {
        (Value::SmallInt(a), Value::SmallInt(b)) => Ok((*a, *b)),
        _ => Err(mismatch(l, r).into()),
    }
}

pub(crate) fn big_operands(l: &Value, r: &Value) -> RuleResult<(BigInt, BigInt)> {
    match (convert::to_bigint(l), convert::to_bigint(r)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(l, r).into()),
    }
}

pub(crate) fn float_operands(l: &Value, r: &Value) -> RuleResult<(f64, f64)> {
    match (convert::to_f64(l), convert::to_f64(r)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(l, r).into()),
    }
}

pub(crate) fn complex_operands(l: &Value, r: &Value) -> RuleResult<(Complex64, Complex64)> {
    match (convert::to_complex(l), convert::to_complex(r)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(mismatch(l, r).into()),
    }
}

pub(crate) fn str_operand<'a>(v: &'a Value, other: &Value) -> RuleResult<&'a str> {
    v.as_str().ok_or_else(|| mismatch(v, other).into())
}

// ========== Shared guard predicates ==========

pub(crate) fn both_lists(l: &Value, r: &Value) -> bool {
    matches!((l.as_sequence(), r.as_sequence()), (Some(a), Some(b)) if a.is_list() && b.is_list())
}

pub(crate) fn both_tuples(l: &Value, r: &Value) -> bool {
    matches!((l.as_sequence(), r.as_sequence()), (Some(a), Some(b)) if a.is_tuple() && b.is_tuple())
}

/// Declares an operator's `static` rule table: operator-specific fixed-width
/// fast paths, the shared numeric rows, operator-specific rows, then the
/// protocol and catch-all rows every table ends with.
macro_rules! rule_set {
    (
        $(#[$meta:meta])*
        $name:ident = $op:expr;
        fast: [$($fast:expr),* $(,)?];
        numeric: ($small:expr, $big:expr, $float:expr, $complex:expr);
        extra: [$($extra:expr),* $(,)?];
    ) => {
        $(#[$meta])*
        pub static $name: $crate::rule::RuleSet = $crate::rule::RuleSet {
            op: $op,
            rules: &[
                $($fast,)*
                Rule::compute(5, "small", Guard::pair(Kind::SmallInt, Kind::SmallInt), $small),
                Rule::compute(6, "small_big", Guard::pair(Kind::SmallInt, Kind::BigInt), $big),
                Rule::compute(7, "big_small", Guard::pair(Kind::BigInt, Kind::SmallInt), $big),
                Rule::compute(8, "integers", Guard::integers(), $big),
                Rule::compute(10, "float_small", Guard::pair(Kind::Float, Kind::SmallInt), $float),
                Rule::compute(11, "small_float", Guard::pair(Kind::SmallInt, Kind::Float), $float),
                Rule::compute(12, "float_big", Guard::pair(Kind::Float, Kind::BigInt), $float),
                Rule::compute(13, "big_float", Guard::pair(Kind::BigInt, Kind::Float), $float),
                Rule::compute(14, "float", Guard::pair(Kind::Float, Kind::Float), $float),
                Rule::compute(
                    20,
                    "complex_integer",
                    Guard::kinds(KindMatch::Exact(Kind::Complex), KindMatch::Integer),
                    $complex,
                ),
                Rule::compute(
                    21,
                    "integer_complex",
                    Guard::kinds(KindMatch::Integer, KindMatch::Exact(Kind::Complex)),
                    $complex,
                ),
                Rule::compute(22, "complex_float", Guard::pair(Kind::Complex, Kind::Float), $complex),
                Rule::compute(23, "float_complex", Guard::pair(Kind::Float, Kind::Complex), $complex),
                Rule::compute(24, "complex", Guard::pair(Kind::Complex, Kind::Complex), $complex),
                $($extra,)*
                Rule::protocol($crate::rules::PROTOCOL_ORDER),
                Rule::unsupported($crate::rules::UNSUPPORTED_ORDER),
            ],
        };
    };
}

mod add;
mod div;
mod modulo;
mod mul;
mod pow;
mod sub;

pub use add::ADD;
pub use div::{FLOOR_DIV, TRUE_DIV};
pub use modulo::MOD;
pub use mul::MUL;
pub use pow::POW;
pub use sub::SUB;
