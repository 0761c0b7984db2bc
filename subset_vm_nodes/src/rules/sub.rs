//! `-` rules.

use crate::error::{RuleResult, Signal};
use crate::kind::Kind;
use crate::op::BinaryOp;
use crate::rule::{Guard, KindMatch, Rule};
use crate::value::Value;

use super::{big_operands, complex_operands, float_operands, small_operands};

fn sub_small(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = small_operands(l, r)?;
    a.checked_sub(b).map(Value::SmallInt).ok_or(Signal::Overflow)
}

fn sub_big(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = big_operands(l, r)?;
    Ok(Value::from_bigint(a - b))
}

fn sub_float(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = float_operands(l, r)?;
    Ok(Value::Float(a - b))
}

fn sub_complex(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = complex_operands(l, r)?;
    Ok(Value::Complex(a - b))
}

rule_set! {
    /// Rules of `-`
    SUB = BinaryOp::Sub;
    fast: [];
    numeric: (sub_small, sub_big, sub_float, sub_complex);
    extra: [];
}
