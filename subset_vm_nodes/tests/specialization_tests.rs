//! Tests for chain growth, ordering and closing.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use subset_vm_nodes::*;

// ==================== Scenarios ====================

#[test]
fn test_repeated_small_add_stabilizes() {
    let mut node = locals_node(BinaryOp::Add, 5);
    let observer = RecordingObserver::default();
    for _ in 0..10 {
        let out = eval_observed(&mut node, &observer, Value::SmallInt(3), Value::SmallInt(4));
        assert_eq!(out, Ok(Value::SmallInt(7)));
    }
    assert_eq!(node.chain().installed_orders(), vec![5]);
    assert_eq!(node.chain().entries()[0].name, "small");
    assert_eq!(observer.len(), 1);
    assert_eq!(node.chain().stats().hits, 9);
}

#[test]
fn test_second_kind_pair_grows_chain() {
    let mut node = locals_node(BinaryOp::Add, 5);
    assert_eq!(eval(&mut node, Value::SmallInt(3), Value::SmallInt(4)), Ok(Value::SmallInt(7)));
    assert_eq!(eval(&mut node, Value::from("a"), Value::from("b")), Ok(Value::from("ab")));
    assert_eq!(node.chain().depth(), 2);
    assert_eq!(node.chain().installed_orders(), vec![5, 30]);
}

#[test]
fn test_depth_limit_closes_chain() {
    let mut node = locals_node(BinaryOp::Add, 3);
    let observer = RecordingObserver::default();
    let calls = [
        (Value::SmallInt(1), Value::SmallInt(2), Value::SmallInt(3)),
        (Value::Float(1.5), Value::Float(2.0), Value::Float(3.5)),
        (Value::from("a"), Value::from("b"), Value::from("ab")),
        (Value::SmallInt(1), Value::Float(0.5), Value::Float(1.5)),
        (Value::complex(1.0, 1.0), Value::complex(0.0, 1.0), Value::complex(1.0, 2.0)),
    ];
    for (i, (l, r, expected)) in calls.into_iter().enumerate() {
        let out = eval_observed(&mut node, &observer, l, r);
        assert_eq!(out, Ok(expected), "call {}", i + 1);
        if i == 2 {
            assert_eq!(node.chain().depth(), 3);
            assert!(!node.chain().is_closed());
        }
    }
    assert!(node.chain().is_closed());
    assert_eq!(node.chain().stats().generic_dispatches, 2);
    assert_eq!(
        observer.changes(),
        vec![
            ShapeChange::Specialized { rule: "small", order: 5, depth: 1 },
            ShapeChange::Specialized { rule: "float", order: 14, depth: 2 },
            ShapeChange::Specialized { rule: "str", order: 30, depth: 3 },
            ShapeChange::Generalized { depth: 3 },
        ]
    );
}

#[test]
fn test_negative_left_modulo() {
    let mut node = locals_node(BinaryOp::Mod, 5);
    assert_eq!(eval(&mut node, Value::SmallInt(-1), Value::SmallInt(3)), Ok(Value::SmallInt(2)));
    assert_eq!(node.chain().entries()[0].name, "small_negative_left");
}

// ==================== Overflow ====================

#[test]
fn test_add_overflow_promotes() {
    let mut node = locals_node(BinaryOp::Add, 5);
    let out = eval(&mut node, Value::SmallInt(2147483647), Value::SmallInt(1));
    assert_eq!(out, Ok(Value::int(2147483648)));
    assert!(matches!(out, Ok(Value::BigInt(_))));
    assert_eq!(node.chain().installed_orders(), vec![8]);
}

#[test]
fn test_overflow_after_small_installed() {
    let mut node = locals_node(BinaryOp::Mul, 5);
    assert_eq!(eval(&mut node, Value::SmallInt(6), Value::SmallInt(7)), Ok(Value::SmallInt(42)));
    let out = eval(&mut node, Value::SmallInt(1 << 16), Value::SmallInt(1 << 16));
    assert_eq!(out, Ok(Value::int(1 << 32)));
    assert_eq!(node.chain().installed_orders(), vec![5, 8]);

    // Both entries stay; fitting products still take the fixed-width entry.
    let hits = node.chain().stats().hits;
    assert_eq!(eval(&mut node, Value::SmallInt(-3), Value::SmallInt(3)), Ok(Value::SmallInt(-9)));
    assert_eq!(node.chain().stats().hits, hits + 1);
    assert_eq!(node.chain().stats().installs, 2);
}

#[test]
fn test_overflow_with_wide_entry_installed() {
    let mut node = locals_node(BinaryOp::Sub, 5);
    eval(&mut node, Value::int(1 << 40), Value::SmallInt(1)).unwrap();
    eval(&mut node, Value::SmallInt(1), Value::SmallInt(1)).unwrap();
    assert_eq!(node.chain().installed_orders(), vec![5, 8]);
    let out = eval(&mut node, Value::SmallInt(i32::MIN), Value::SmallInt(1));
    assert_eq!(out, Ok(Value::int(i32::MIN as i64 - 1)));
    assert_eq!(node.chain().installed_orders(), vec![5, 7, 8]);
}

#[test]
fn test_overflow_at_capacity_goes_generic() {
    let mut node = locals_node(BinaryOp::Add, 1);
    eval(&mut node, Value::SmallInt(1), Value::SmallInt(1)).unwrap();
    let out = eval(&mut node, Value::SmallInt(i32::MAX), Value::SmallInt(i32::MAX));
    assert_eq!(out, Ok(Value::int(2 * i32::MAX as i64)));
    assert!(node.chain().is_closed());
}

#[test]
fn test_floor_div_min_by_minus_one() {
    let mut node = locals_node(BinaryOp::FloorDiv, 5);
    let out = eval(&mut node, Value::SmallInt(i32::MIN), Value::SmallInt(-1));
    assert_eq!(out, Ok(Value::int(2147483648)));
}

// ==================== Chain invariants ====================

#[test]
fn test_entries_stay_sorted_and_unique() {
    let mut node = locals_node(BinaryOp::Add, 8);
    let operands = [
        (Value::complex(0.0, 1.0), Value::complex(0.0, 1.0)),
        (Value::from("a"), Value::from("b")),
        (Value::Float(1.0), Value::SmallInt(2)),
        (Value::SmallInt(1), Value::SmallInt(2)),
        (Value::from("c"), Value::from("d")),
        (Value::SmallInt(3), Value::SmallInt(4)),
        (Value::list(vec![]), Value::list(vec![])),
    ];
    for (l, r) in operands {
        eval(&mut node, l, r).unwrap();
        let orders = node.chain().installed_orders();
        assert!(orders.windows(2).all(|w| w[0] < w[1]), "{:?}", orders);
    }
    assert_eq!(node.chain().installed_orders(), vec![5, 10, 24, 30, 41]);
    assert!(node.chain().verify(node.id()).is_ok());
}

#[test]
fn test_growth_is_monotonic_while_open() {
    let mut node = locals_node(BinaryOp::Mul, 5);
    let mut previous: Vec<u16> = Vec::new();
    for (l, r) in [
        (Value::SmallInt(2), Value::SmallInt(3)),
        (Value::SmallInt(2), Value::from("x")),
        (Value::SmallInt(2), Value::SmallInt(5)),
        (Value::Float(2.0), Value::Float(3.0)),
        (Value::from("x"), Value::SmallInt(2)),
    ] {
        eval(&mut node, l, r).unwrap();
        let current = node.chain().installed_orders();
        assert!(previous.iter().all(|o| current.contains(o)));
        assert!(current.len() >= previous.len());
        previous = current;
    }
    assert_eq!(previous, vec![5, 14, 32, 33]);
}

#[test]
fn test_converges_within_depth_distinct_pairs() {
    let depth = 4;
    let mut node = locals_node(BinaryOp::Sub, depth);
    let pairs = [
        (Value::SmallInt(1), Value::SmallInt(1)),
        (Value::Float(1.0), Value::Float(1.0)),
        (Value::SmallInt(1), Value::Float(1.0)),
        (Value::Float(1.0), Value::SmallInt(1)),
        (Value::complex(1.0, 0.0), Value::complex(1.0, 0.0)),
        (Value::int(1 << 40), Value::SmallInt(1)),
    ];
    for round in 0..3 {
        let installs_before = node.chain().stats().installs;
        for (l, r) in pairs.iter().cloned() {
            eval(&mut node, l, r).unwrap();
        }
        if round > 0 {
            assert_eq!(node.chain().stats().installs, installs_before);
        }
    }
    assert!(node.chain().is_closed());
    assert_eq!(node.chain().stats().installs, depth as u64);
}

#[test]
fn test_closed_chain_never_reopens() {
    let mut node = locals_node(BinaryOp::Add, 5);
    let observer = RecordingObserver::default();
    let err = eval_observed(&mut node, &observer, Value::from("a"), Value::SmallInt(1)).unwrap_err();
    assert!(err.is_type_error());
    assert!(node.chain().is_closed());
    for _ in 0..3 {
        let out = eval_observed(&mut node, &observer, Value::SmallInt(1), Value::SmallInt(1));
        assert_eq!(out, Ok(Value::SmallInt(2)));
    }
    assert!(node.chain().is_closed());
    assert_eq!(observer.changes(), vec![ShapeChange::Generalized { depth: 0 }]);
}

// ==================== Errors ====================

#[test]
fn test_type_error_names_operator_and_kinds() {
    let mut node = locals_node(BinaryOp::Sub, 5);
    let err = eval(&mut node, Value::from("a"), Value::list(vec![])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "TypeError: unsupported operand type(s) for -: 'str' and 'list'"
    );
}

#[test]
fn test_zero_division_is_not_a_type_error() {
    let mut node = locals_node(BinaryOp::TrueDiv, 5);
    let err = eval(&mut node, Value::SmallInt(1), Value::SmallInt(0)).unwrap_err();
    assert_eq!(err.to_string(), "ZeroDivisionError: division by zero");
    assert!(!err.is_type_error());
    assert_eq!(eval(&mut node, Value::SmallInt(1), Value::SmallInt(4)), Ok(Value::Float(0.25)));
    assert_eq!(node.chain().installed_orders(), vec![5]);
}

#[test]
fn test_string_formatting_through_node() {
    let mut node = locals_node(BinaryOp::Mod, 5);
    let args = Value::tuple(vec![Value::from("x"), Value::Float(1.5)]);
    assert_eq!(eval(&mut node, Value::from("%s=%r"), args), Ok(Value::from("x=1.5")));
    let err = eval(&mut node, Value::from("%d %d"), Value::SmallInt(1)).unwrap_err();
    assert_eq!(err.to_string(), "TypeError: not enough arguments for format string");
    assert_eq!(node.chain().installed_orders(), vec![30]);
}

// ==================== Notifications ====================

#[test]
fn test_one_notification_per_transition() {
    let mut left = locals_node(BinaryOp::Add, 2);
    let mut right = locals_node(BinaryOp::Add, 2);
    let observer = RecordingObserver::default();
    eval_observed(&mut left, &observer, Value::SmallInt(1), Value::SmallInt(1)).unwrap();
    eval_observed(&mut right, &observer, Value::Float(1.0), Value::Float(1.0)).unwrap();
    eval_observed(&mut left, &observer, Value::SmallInt(2), Value::SmallInt(2)).unwrap();

    let events = observer.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].0, left.id());
    assert_eq!(events[1].0, right.id());
    assert_ne!(left.id(), right.id());
}

// ==================== Reused frames ====================

#[test]
fn test_loop_over_one_frame() {
    // acc = acc * 3, starting from 1, until it leaves the small range.
    let mut node = locals_node(BinaryOp::Mul, 5);
    let mut frame = Frame::with_slots(2);
    assert_eq!(frame.slot_count(), 2);
    frame.write(0, Value::SmallInt(1));
    frame.write(1, Value::SmallInt(3));
    for _ in 0..25 {
        let next = node.evaluate(&frame, &EvalContext::detached()).unwrap();
        frame.write(0, next);
    }
    assert_eq!(frame.read(0), &Value::int(3i64.pow(25)));
    assert_eq!(node.chain().installed_orders(), vec![5, 8]);
}

// ==================== Wide operands ====================

#[test]
fn test_wide_repeat_count_through_node() {
    let mut node = locals_node(BinaryOp::Mul, 5);
    let negative = Value::int(-(1 << 40));
    assert_eq!(eval(&mut node, Value::from("ab"), negative), Ok(Value::from("")));
    let err = eval(&mut node, Value::int(1 << 40), Value::from("ab")).unwrap_err();
    assert!(matches!(err, NodeError::OverflowError(_)));
    assert_eq!(node.chain().installed_orders(), vec![36, 37]);
}

#[test]
fn test_true_division_of_huge_integers() {
    let mut node = locals_node(BinaryOp::TrueDiv, 5);
    let ten = num_bigint::BigInt::from(10);
    let out = eval(
        &mut node,
        Value::from_bigint(ten.pow(400) + 1),
        Value::from_bigint(ten.pow(399)),
    );
    assert_eq!(out, Ok(Value::Float(10.0)));
    let err = eval(&mut node, Value::from_bigint(ten.pow(400)), Value::SmallInt(1)).unwrap_err();
    assert!(matches!(err, NodeError::OverflowError(_)));
}
