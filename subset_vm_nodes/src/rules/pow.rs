//! `**` rules.

use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{NodeError, RuleResult, Signal};
use crate::kind::Kind;
use crate::op::BinaryOp;
use crate::rule::{Guard, KindMatch, Rule};
use crate::value::Value;

use super::{big_operands, complex_operands, float_operands, small_operands};

/// Largest integer power result, in bits, computed exactly.
const MAX_POW_BITS: u64 = 1 << 26;

fn zero_to_negative() -> Signal {
    Signal::Raise(NodeError::zero_division(
        "0.0 cannot be raised to a negative power",
    ))
}

fn too_large() -> Signal {
    Signal::Raise(NodeError::overflow_error("integer power result too large"))
}

/// Float result of an integer base raised to a negative exponent.
fn negative_exponent(base: f64, exp: f64) -> RuleResult<Value> {
    if base == 0.0 {
        return Err(zero_to_negative());
    }
    Ok(Value::Float(base.powf(exp)))
}

fn pow_small(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = small_operands(l, r)?;
    if b < 0 {
        return negative_exponent(f64::from(a), f64::from(b));
    }
    // b >= 0 here, so the cast is lossless
    a.checked_pow(b as u32).map(Value::SmallInt).ok_or(Signal::Overflow)
}

fn pow_big(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = big_operands(l, r)?;
    if b.is_negative() {
        let base = float_operands(l, r)?.0;
        let exp = b.to_f64().unwrap_or(f64::NEG_INFINITY);
        return negative_exponent(base, exp);
    }
    if a.is_zero() || a.is_one() {
        return Ok(Value::from_bigint(if b.is_zero() { BigInt::one() } else { a }));
    }
    if a == BigInt::from(-1) {
        return Ok(Value::SmallInt(if b.is_odd() { -1 } else { 1 }));
    }
    let exp = b.to_u32().ok_or_else(too_large)?;
    if a.bits().saturating_mul(u64::from(exp)) > MAX_POW_BITS {
        return Err(too_large());
    }
    Ok(Value::from_bigint(a.pow(exp)))
}

fn pow_float(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = float_operands(l, r)?;
    if a == 0.0 && b < 0.0 {
        return Err(zero_to_negative());
    }
    if a < 0.0 && b.fract() != 0.0 && b.is_finite() {
        let c = Complex64::new(a, 0.0).powc(Complex64::new(b, 0.0));
        return Ok(Value::Complex(c));
    }
    let v = a.powf(b);
    if v.is_infinite() && a.is_finite() && b.is_finite() {
        return Err(Signal::Raise(NodeError::overflow_error(
            "float power result too large",
        )));
    }
    Ok(Value::Float(v))
}

fn pow_complex(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = complex_operands(l, r)?;
    if a.is_zero() {
        if b.is_zero() {
            return Ok(Value::complex(1.0, 0.0));
        }
        if b.im != 0.0 || b.re < 0.0 {
            return Err(Signal::Raise(NodeError::zero_division(
                "0.0 to a negative or complex power",
            )));
        }
        return Ok(Value::complex(0.0, 0.0));
    }
    // Small integral exponents multiply exactly instead of going through log/exp.
    if b.im == 0.0 && b.re.fract() == 0.0 && b.re.abs() <= 100.0 {
        return Ok(Value::Complex(a.powi(b.re as i32)));
    }
    Ok(Value::Complex(a.powc(b)))
}

rule_set! {
    /// Rules of `**`
    POW = BinaryOp::Pow;
    fast: [];
    numeric: (pow_small, pow_big, pow_float, pow_complex);
    extra: [];
}
