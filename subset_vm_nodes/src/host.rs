//! Interfaces to the rest of the interpreter.
//!
//! Operator nodes depend on two collaborators they do not implement: the
//! object model, which resolves operator protocol methods on guest objects,
//! and the tree observer, which is told whenever a node changes shape.

use crate::error::{NodeError, NodeResult};
use crate::frame::Frame;
use crate::node::{NodeId, ShapeChange};
use crate::value::Value;

/// Resolves operator protocol methods (`__add__`, ...) on guest objects.
pub trait ObjectModel {
    /// Invoke the protocol method `name` for `left <op> right`. Method
    /// resolution order, including reflected methods, is up to the model.
    fn invoke_operator_protocol(
        &self,
        name: &'static str,
        left: &Value,
        right: &Value,
        frame: &Frame,
    ) -> NodeResult<Value>;
}

/// Object model without any guest classes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoObjectModel;

impl ObjectModel for NoObjectModel {
    fn invoke_operator_protocol(
        &self,
        name: &'static str,
        left: &Value,
        right: &Value,
        _frame: &Frame,
    ) -> NodeResult<Value> {
        Err(NodeError::no_protocol_method(
            name,
            left.type_name(),
            right.type_name(),
        ))
    }
}

/// Notified once per node shape transition. Cannot fail.
pub trait TreeObserver {
    fn shape_changed(&self, node: NodeId, change: &ShapeChange);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TreeObserver for NoopObserver {
    fn shape_changed(&self, _node: NodeId, _change: &ShapeChange) {}
}

/// Collaborators passed down through evaluation.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub objects: &'a dyn ObjectModel,
    pub observer: &'a dyn TreeObserver,
}

impl<'a> EvalContext<'a> {
    pub fn new(objects: &'a dyn ObjectModel, observer: &'a dyn TreeObserver) -> Self {
        Self { objects, observer }
    }

    /// No guest classes, no observer.
    pub fn detached() -> EvalContext<'static> {
        EvalContext {
            objects: &NoObjectModel,
            observer: &NoopObserver,
        }
    }
}

impl std::fmt::Debug for EvalContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvalContext").finish_non_exhaustive()
    }
}
