//! `/` and `//` rules.

use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::error::{NodeError, RuleResult, Signal};
use crate::kind::Kind;
use crate::op::BinaryOp;
use crate::rule::{Guard, KindMatch, Rule};
use crate::value::Value;

use super::{big_operands, complex_operands, float_operands, small_operands};

/// Bits of divisor kept when taking the fractional part of a quotient
const FRACTION_BITS: u64 = 1000;

fn zero_division(msg: &str) -> Signal {
    Signal::Raise(NodeError::zero_division(msg))
}

// ========== True division ==========

fn truediv_small(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = small_operands(l, r)?;
    if b == 0 {
        return Err(zero_division("division by zero"));
    }
    Ok(Value::Float(f64::from(a) / f64::from(b)))
}

fn truediv_big(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = big_operands(l, r)?;
    if b.is_zero() {
        return Err(zero_division("division by zero"));
    }
    // a / b == q + rem / b with |rem| < |b|. The fraction is taken on both
    // operands shifted down to float range, so huge operands with a small
    // quotient still divide.
    let (q, rem) = a.div_rem(&b);
    let whole = q.to_f64().unwrap_or(f64::INFINITY);
    let frac = if rem.is_zero() {
        0.0
    } else {
        let shift = b.bits().saturating_sub(FRACTION_BITS);
        match ((&rem >> shift).to_f64(), (&b >> shift).to_f64()) {
            (Some(x), Some(y)) => x / y,
            _ => 0.0,
        }
    };
    let out = whole + frac;
    if out.is_finite() {
        Ok(Value::Float(out))
    } else {
        Err(Signal::Raise(NodeError::overflow_error(
            "integer division result too large for a float",
        )))
    }
}

fn truediv_float(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = float_operands(l, r)?;
    if b == 0.0 {
        return Err(zero_division("float division by zero"));
    }
    Ok(Value::Float(a / b))
}

fn truediv_complex(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = complex_operands(l, r)?;
    if b.is_zero() {
        return Err(zero_division("complex division by zero"));
    }
    Ok(Value::Complex(a / b))
}

rule_set! {
    /// Rules of `/`
    TRUE_DIV = BinaryOp::TrueDiv;
    fast: [];
    numeric: (truediv_small, truediv_big, truediv_float, truediv_complex);
    extra: [];
}

// ========== Floor division ==========

/// Floor of `a / b` in fixed width. `i32::MIN // -1` cedes to the wide rule.
fn floordiv_small(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = small_operands(l, r)?;
    if b == 0 {
        return Err(zero_division("integer division or modulo by zero"));
    }
    let q = a.checked_div(b).ok_or(Signal::Overflow)?;
    let adjust = a % b != 0 && ((a < 0) != (b < 0));
    Ok(Value::SmallInt(if adjust { q - 1 } else { q }))
}

fn floordiv_big(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = big_operands(l, r)?;
    if b.is_zero() {
        return Err(zero_division("integer division or modulo by zero"));
    }
    Ok(Value::from_bigint(a.div_floor(&b)))
}

fn floordiv_float(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = float_operands(l, r)?;
    if b == 0.0 {
        return Err(zero_division("float floor division by zero"));
    }
    Ok(Value::Float((a / b).floor()))
}

/// Complex numbers have no floor.
fn floordiv_complex(l: &Value, r: &Value) -> RuleResult<Value> {
    Err(Signal::Raise(NodeError::unsupported(
        BinaryOp::FloorDiv,
        l.type_name(),
        r.type_name(),
    )))
}

rule_set! {
    /// Rules of `//`
    FLOOR_DIV = BinaryOp::FloorDiv;
    fast: [];
    numeric: (floordiv_small, floordiv_big, floordiv_float, floordiv_complex);
    extra: [];
}
