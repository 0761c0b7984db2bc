//! Rule invocation and the generic path.
//!
//! The generic path is what a chain runs once it has closed: the operator's
//! full rule table, scanned in declared order on every call, with nothing
//! cached. It is also usable on its own as an uncached reference evaluator.

use crate::error::{NodeError, NodeResult, RuleResult, Signal};
use crate::frame::Frame;
use crate::host::EvalContext;
use crate::kind::Kind;
use crate::rule::{Action, Rule, RuleSet};
use crate::value::Value;

/// Run one rule's action on already-guarded operands.
pub fn invoke(
    rules: &RuleSet,
    rule: &Rule,
    left: &Value,
    right: &Value,
    frame: &Frame,
    cx: &EvalContext<'_>,
) -> RuleResult<Value> {
    match rule.action {
        Action::Compute(f) => f(left, right),
        Action::Protocol => cx
            .objects
            .invoke_operator_protocol(rules.op.method_name(), left, right, frame)
            .map_err(Signal::Raise),
        Action::Unsupported => Err(Signal::Raise(unsupported(rules, left, right))),
    }
}

/// Evaluate `left <op> right` against the whole table without caching.
///
/// The first matching rule runs; a rule that overflows cedes to the next
/// matching rule. No match at all is an unsupported-operands error.
pub fn generic_execute(
    rules: &RuleSet,
    left: &Value,
    right: &Value,
    frame: &Frame,
    cx: &EvalContext<'_>,
) -> NodeResult<Value> {
    let (lk, rk) = (Kind::of(left), Kind::of(right));
    for rule in rules.rules {
        if !rule.matches(lk, rk, left, right) {
            continue;
        }
        match invoke(rules, rule, left, right, frame, cx) {
            Ok(value) => return Ok(value),
            Err(Signal::Raise(err)) => return Err(err),
            Err(Signal::Overflow) => {
                log::trace!(
                    "generic {}: rule {} overflowed on ({}, {}), ceding",
                    rules.op,
                    rule.name,
                    lk,
                    rk
                );
            }
        }
    }
    Err(unsupported(rules, left, right))
}

fn unsupported(rules: &RuleSet, left: &Value, right: &Value) -> NodeError {
    NodeError::unsupported(rules.op, left.type_name(), right.type_name())
}
