//! Self-specializing arithmetic operator nodes for the SubsetVM tree
//! interpreter.
//!
//! Each binary operator node carries a specialization chain: a short,
//! ordered list of the rules it has actually needed so far. The crate
//! provides:
//!
//! - `Value` and `Kind` for dynamic values and their classification
//! - Per-operator static rule tables (`rules`)
//! - The chain state machine and the generic fallback path
//! - `BinaryOpNode` / `ExprNode` for single-owner trees and
//!   `SharedBinaryOp` for a chain shared between threads
//! - `%` string formatting
//! - `SpecializeConfig` for the chain depth limit

pub mod chain;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod frame;
pub mod host;
pub mod kind;
pub mod node;
pub mod op;
pub mod rule;
pub mod rules;
pub mod sequence;
pub mod shared;
pub mod value;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use subset_vm_nodes::prelude::*;
///
/// let mut node = ExprNode::binary_with(
///     BinaryOp::Add,
///     ExprNode::literal(2147483647),
///     ExprNode::literal(1),
///     &SpecializeConfig::default(),
/// );
/// let value = node.evaluate(&Frame::default(), &EvalContext::detached()).unwrap();
/// assert_eq!(value, Value::int(2147483648));
/// ```
pub mod prelude {
    pub use super::chain::{Chain, ChainState, ChainStats};
    pub use super::config::SpecializeConfig;
    pub use super::error::{NodeError, NodeResult, StructuralViolation};
    pub use super::frame::Frame;
    pub use super::host::{EvalContext, NoObjectModel, NoopObserver, ObjectModel, TreeObserver};
    pub use super::kind::Kind;
    pub use super::node::{BinaryOpNode, ExprNode, NodeId, ShapeChange};
    pub use super::op::BinaryOp;
    pub use super::shared::SharedBinaryOp;
    pub use super::value::{GuestObject, Value};
}

pub use prelude::*;
