//! `*` rules, including sequence and string repetition.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};

use crate::error::{NodeError, RuleResult, Signal};
use crate::kind::Kind;
use crate::op::BinaryOp;
use crate::rule::{Guard, KindMatch, Rule};
use crate::value::Value;

use super::{big_operands, complex_operands, float_operands, small_operands};

/// Longest sequence or string a repetition may build
const MAX_REPEAT_LEN: usize = 1 << 28;

fn mul_small(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = small_operands(l, r)?;
    a.checked_mul(b).map(Value::SmallInt).ok_or(Signal::Overflow)
}

fn mul_big(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = big_operands(l, r)?;
    Ok(Value::from_bigint(a * b))
}

fn mul_float(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = float_operands(l, r)?;
    Ok(Value::Float(a * b))
}

fn mul_complex(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = complex_operands(l, r)?;
    Ok(Value::Complex(a * b))
}

/// Wide counts saturate; any of them is either empty or too long.
fn saturating_count(n: &BigInt) -> i64 {
    n.to_i64()
        .unwrap_or(if n.is_negative() { i64::MIN } else { i64::MAX })
}

/// Split a (count, repeated) pair regardless of operand position.
fn count_and<'a>(l: &'a Value, r: &'a Value) -> RuleResult<(i64, &'a Value)> {
    match (l, r) {
        (Value::SmallInt(n), other) | (other, Value::SmallInt(n)) => Ok((i64::from(*n), other)),
        (Value::BigInt(n), other) | (other, Value::BigInt(n)) => Ok((saturating_count(n), other)),
        _ => Err(Signal::Raise(NodeError::unsupported(
            BinaryOp::Mul,
            l.type_name(),
            r.type_name(),
        ))),
    }
}

/// Number of copies to build, rejecting results longer than [`MAX_REPEAT_LEN`].
fn check_repeat_len(len: usize, count: i64, what: &str) -> RuleResult<usize> {
    if len == 0 || count <= 0 {
        return Ok(0);
    }
    let count = usize::try_from(count).unwrap_or(usize::MAX);
    match len.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(count),
        _ => Err(Signal::Raise(NodeError::overflow_error(format!(
            "repeated {} is too long",
            what
        )))),
    }
}

fn repeat_sequence(l: &Value, r: &Value) -> RuleResult<Value> {
    let (n, seq) = count_and(l, r)?;
    match seq.as_sequence() {
        Some(seq) => {
            check_repeat_len(seq.len(), n, "sequence")?;
            Ok(Value::from(seq.repeat(n)))
        }
        None => Err(Signal::Raise(NodeError::unsupported(
            BinaryOp::Mul,
            l.type_name(),
            r.type_name(),
        ))),
    }
}

fn repeat_str(l: &Value, r: &Value) -> RuleResult<Value> {
    let (n, s) = count_and(l, r)?;
    match s.as_str() {
        Some(s) => {
            let copies = check_repeat_len(s.len(), n, "string")?;
            Ok(Value::Str(s.repeat(copies)))
        }
        None => Err(Signal::Raise(NodeError::unsupported(
            BinaryOp::Mul,
            l.type_name(),
            r.type_name(),
        ))),
    }
}

rule_set! {
    /// Rules of `*`
    MUL = BinaryOp::Mul;
    fast: [];
    numeric: (mul_small, mul_big, mul_float, mul_complex);
    extra: [
        Rule::compute(30, "small_sequence", Guard::pair(Kind::SmallInt, Kind::Sequence), repeat_sequence),
        Rule::compute(31, "sequence_small", Guard::pair(Kind::Sequence, Kind::SmallInt), repeat_sequence),
        Rule::compute(32, "small_str", Guard::pair(Kind::SmallInt, Kind::Str), repeat_str),
        Rule::compute(33, "str_small", Guard::pair(Kind::Str, Kind::SmallInt), repeat_str),
        Rule::compute(34, "big_sequence", Guard::pair(Kind::BigInt, Kind::Sequence), repeat_sequence),
        Rule::compute(35, "sequence_big", Guard::pair(Kind::Sequence, Kind::BigInt), repeat_sequence),
        Rule::compute(36, "big_str", Guard::pair(Kind::BigInt, Kind::Str), repeat_str),
        Rule::compute(37, "str_big", Guard::pair(Kind::Str, Kind::BigInt), repeat_str),
    ];
}
