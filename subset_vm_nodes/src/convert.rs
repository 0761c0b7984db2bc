//! Numeric promotion helpers
//!
//! Rules guard on operand kinds and then widen both operands to the kind the
//! rule computes in. These helpers do the widening; they return `None` when
//! the value is not on the numeric ladder at or below the target.

use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::ToPrimitive;

use crate::value::Value;

/// Widen an integer value to `BigInt`
pub fn to_bigint(value: &Value) -> Option<BigInt> {
    match value {
        Value::SmallInt(v) => Some(BigInt::from(*v)),
        Value::BigInt(v) => Some(v.clone()),
        _ => None,
    }
}

/// Widen an integer or float to `f64`. Integers beyond the float range
/// become infinities.
pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::SmallInt(v) => Some(f64::from(*v)),
        Value::BigInt(v) => Some(bigint_to_f64(v)),
        Value::Float(v) => Some(*v),
        _ => None,
    }
}

/// Widen any numeric value to a complex number
pub fn to_complex(value: &Value) -> Option<Complex64> {
    match value {
        Value::Complex(c) => Some(*c),
        other => to_f64(other).map(|re| Complex64::new(re, 0.0)),
    }
}

fn bigint_to_f64(v: &BigInt) -> f64 {
    v.to_f64().unwrap_or_else(|| {
        if v.sign() == num_bigint::Sign::Minus {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    })
}
