//! `+` rules.

use crate::error::{NodeError, RuleResult, Signal};
use crate::kind::Kind;
use crate::op::BinaryOp;
use crate::rule::{Guard, KindMatch, Rule};
use crate::value::Value;

use super::{
    big_operands, both_lists, both_tuples, complex_operands, float_operands, small_operands,
    str_operand,
};

fn add_small(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = small_operands(l, r)?;
    a.checked_add(b).map(Value::SmallInt).ok_or(Signal::Overflow)
}

fn add_big(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = big_operands(l, r)?;
    Ok(Value::from_bigint(a + b))
}

fn add_float(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = float_operands(l, r)?;
    Ok(Value::Float(a + b))
}

fn add_complex(l: &Value, r: &Value) -> RuleResult<Value> {
    let (a, b) = complex_operands(l, r)?;
    Ok(Value::Complex(a + b))
}

fn add_str(l: &Value, r: &Value) -> RuleResult<Value> {
    let a = str_operand(l, r)?;
    let b = str_operand(r, l)?;
    let mut s = String::with_capacity(a.len() + b.len());
    s.push_str(a);
    s.push_str(b);
    Ok(Value::Str(s))
}

fn int_storage_lists(l: &Value, r: &Value) -> bool {
    both_lists(l, r)
        && l.as_sequence().is_some_and(|s| s.has_int_storage())
        && r.as_sequence().is_some_and(|s| s.has_int_storage())
}

fn object_storage_lists(l: &Value, r: &Value) -> bool {
    both_lists(l, r)
        && l.as_sequence().is_some_and(|s| s.has_object_storage())
        && r.as_sequence().is_some_and(|s| s.has_object_storage())
}

/// Same-strategy lists: extend a copy of the left storage in place.
fn add_list_extend(l: &Value, r: &Value) -> RuleResult<Value> {
    match (l.as_sequence(), r.as_sequence()) {
        (Some(a), Some(b)) => Ok(Value::from(a.extended(b))),
        _ => Err(unsupported(l, r)),
    }
}

/// Generic concatenation for lists of different strategies and for tuples.
fn add_concat(l: &Value, r: &Value) -> RuleResult<Value> {
    match (l.as_sequence(), r.as_sequence()) {
        (Some(a), Some(b)) => Ok(Value::from(a.concat(b))),
        _ => Err(unsupported(l, r)),
    }
}

fn unsupported(l: &Value, r: &Value) -> Signal {
    Signal::Raise(NodeError::unsupported(
        BinaryOp::Add,
        l.type_name(),
        r.type_name(),
    ))
}

rule_set! {
    /// Rules of `+`
    ADD = BinaryOp::Add;
    fast: [];
    numeric: (add_small, add_big, add_float, add_complex);
    extra: [
        Rule::compute(30, "str", Guard::pair(Kind::Str, Kind::Str), add_str),
        Rule::compute(
            40,
            "list_int_storage",
            Guard::pair_when(Kind::Sequence, Kind::Sequence, "both int-storage lists", int_storage_lists),
            add_list_extend,
        ),
        Rule::compute(
            41,
            "list_object_storage",
            Guard::pair_when(
                Kind::Sequence,
                Kind::Sequence,
                "both object-storage lists",
                object_storage_lists,
            ),
            add_list_extend,
        ),
        Rule::compute(
            42,
            "list",
            Guard::pair_when(Kind::Sequence, Kind::Sequence, "both lists", both_lists),
            add_concat,
        ),
        Rule::compute(
            43,
            "tuple",
            Guard::pair_when(Kind::Sequence, Kind::Sequence, "both tuples", both_tuples),
            add_concat,
        ),
    ];
}
