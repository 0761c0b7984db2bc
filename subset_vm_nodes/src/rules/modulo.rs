//! `%` rules.
//!
//! The remainder takes the sign of the divisor (`-1 % 3 == 2`). The two
//! fixed-width fast paths split on the sign of the left operand so the common
//! non-negative case stays a plain machine remainder.

use num_integer::Integer;
use num_traits::Zero;

use crate::error::{NodeError, RuleResult, Signal};
use crate::format::percent_format;
use crate::kind::Kind;
use crate::op::BinaryOp;
use crate::rule::{Guard, KindMatch, Rule};
use crate::value::Value;

use super::{big_operands, complex_operands, float_operands, small_operands, str_operand};

fn zero_division(msg: &str) -> Signal {
    Signal::Raise(NodeError::zero_division(msg))
}

fn left_non_negative(l: &Value, r: &Value) -> bool {
    matches!((l, r), (Value::SmallInt(a), Value::SmallInt(b)) if *a >= 0 && *b > 0)
}

fn left_negative(l: &Value, r: &Value) -> bool {
    matches!((l, r), (Value::SmallInt(a), Value::SmallInt(b)) if *a < 0 && *b > 0)
}

fn mod_non_negative(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = small_operands(l, r)?;
    Ok(Value::SmallInt(a % b))
}

/// Negative dividend, positive divisor: shift the truncated remainder up.
fn mod_negative_left(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = small_operands(l, r)?;
    Ok(Value::SmallInt((a % b + b) % b))
}

/// Any sign combination. `i32::MIN % -1` cedes to the wide rule.
fn mod_small(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = small_operands(l, r)?;
    if b == 0 {
        return Err(zero_division("integer division or modulo by zero"));
    }
    let m = a.checked_rem(b).ok_or(Signal::Overflow)?;
    Ok(Value::SmallInt(if m != 0 && ((m < 0) != (b < 0)) { m + b } else { m }))
}

fn mod_big(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = big_operands(l, r)?;
    if b.is_zero() {
        return Err(zero_division("integer division or modulo by zero"));
    }
    Ok(Value::from_bigint(a.mod_floor(&b)))
}

fn mod_float(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = float_operands(l, r)?;
    if b == 0.0 {
        return Err(zero_division("float modulo"));
    }
    let m = a % b;
    Ok(Value::Float(if m != 0.0 && ((m < 0.0) != (b < 0.0)) { m + b } else { m }))
}

/// Complex numbers have no remainder.
fn mod_complex(l: &Value, r: &Value) -> RuleResult<Value> {
    let _ = complex_operands(l, r)?;
    Err(Signal::Raise(NodeError::unsupported(
        BinaryOp::Mod,
        l.type_name(),
        r.type_name(),
    )))
}

fn mod_format(l: &Value, r: &Value) -> RuleResult<Value> {
    let template = str_operand(l, r)?;
    Ok(Value::Str(percent_format(template, r)?))
}

rule_set! {
    /// Rules of `%`
    MOD = BinaryOp::Mod;
    fast: [
        Rule::compute(
            0,
            "small_non_negative",
            Guard::pair_when(Kind::SmallInt, Kind::SmallInt, "left >= 0 and right > 0", left_non_negative),
            mod_non_negative,
        ),
        Rule::compute(
            1,
            "small_negative_left",
            Guard::pair_when(Kind::SmallInt, Kind::SmallInt, "left < 0 and right > 0", left_negative),
            mod_negative_left,
        ),
    ];
    numeric: (mod_small, mod_big, mod_float, mod_complex);
    extra: [
        Rule::compute(
            30,
            "str_format",
            Guard::kinds(KindMatch::Exact(Kind::Str), KindMatch::Fixed),
            mod_format,
        ),
    ];
}
