//! Shared helpers for integration tests
// Each test target uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use subset_vm_nodes::*;

/// Observer that records every shape change
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<(NodeId, ShapeChange)>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<(NodeId, ShapeChange)> {
        self.events.lock().clone()
    }

    pub fn changes(&self) -> Vec<ShapeChange> {
        self.events.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }
}

impl TreeObserver for RecordingObserver {
    fn shape_changed(&self, node: NodeId, change: &ShapeChange) {
        self.events.lock().push((node, change.clone()));
    }
}

/// Object model with one guest class, `Money { cents }`, that defines
/// `__add__` (Money or int on the right) and `__mul__` (int on the right).
#[derive(Debug, Default)]
pub struct MoneyModel {
    calls: AtomicUsize,
}

impl MoneyModel {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn money(cents: i32) -> Value {
    Value::object(GuestObject::new("Money").with_field("cents", Value::SmallInt(cents)))
}

pub fn cents(value: &Value) -> Option<i32> {
    value
        .as_object()
        .filter(|o| o.class_name == "Money")
        .and_then(|o| o.field("cents"))
        .and_then(Value::as_small_int)
}

impl ObjectModel for MoneyModel {
    fn invoke_operator_protocol(
        &self,
        name: &'static str,
        left: &Value,
        right: &Value,
        _frame: &Frame,
    ) -> NodeResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let no_method = || NodeError::no_protocol_method(name, left.type_name(), right.type_name());
        let a = cents(left).ok_or_else(no_method)?;
        match (name, right) {
            ("__add__", Value::SmallInt(b)) => Ok(money(a + b)),
            ("__add__", other) => cents(other).map(|b| money(a + b)).ok_or_else(no_method),
            ("__mul__", Value::SmallInt(b)) => Ok(money(a * b)),
            _ => Err(no_method()),
        }
    }
}

// ==================== Builders ====================

pub fn config(depth: usize) -> SpecializeConfig {
    SpecializeConfig::new(depth).expect("valid depth")
}

/// `slot0 <op> slot1` with the given chain depth
pub fn locals_node(op: BinaryOp, depth: usize) -> BinaryOpNode {
    BinaryOpNode::new(op, ExprNode::local(0), ExprNode::local(1), &config(depth))
}

pub fn frame(left: Value, right: Value) -> Frame {
    Frame::new(vec![left, right])
}

/// Evaluate `node` on the two operands without an object model.
pub fn eval(node: &mut BinaryOpNode, left: Value, right: Value) -> NodeResult<Value> {
    node.evaluate(&frame(left, right), &EvalContext::detached())
}

pub fn eval_observed(
    node: &mut BinaryOpNode,
    observer: &RecordingObserver,
    left: Value,
    right: Value,
) -> NodeResult<Value> {
    let cx = EvalContext::new(&NoObjectModel, observer);
    node.evaluate(&frame(left, right), &cx)
}

/// Operands covering every kind, with values near the fixed-width limits
pub fn sample_operands() -> Vec<Value> {
    vec![
        Value::SmallInt(0),
        Value::SmallInt(3),
        Value::SmallInt(-7),
        Value::SmallInt(i32::MAX),
        Value::SmallInt(i32::MIN),
        Value::SmallInt(-1),
        Value::int(1 << 40),
        Value::int(-(1 << 35) - 3),
        Value::Float(2.5),
        Value::Float(-0.75),
        Value::Float(0.0),
        Value::complex(1.0, -2.0),
        Value::from("ab"),
        Value::from("%s!"),
        Value::list(vec![Value::SmallInt(1), Value::SmallInt(2)]),
        Value::list(vec![Value::from("x")]),
        Value::tuple(vec![Value::SmallInt(9)]),
    ]
}
