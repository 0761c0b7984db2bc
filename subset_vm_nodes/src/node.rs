//! Expression nodes.
//!
//! [`BinaryOpNode`] is the self-specializing operator node: it evaluates its
//! operands left to right and hands them to its [`Chain`]. The node itself
//! never moves when the chain changes shape, so parents keep their child
//! references and observers identify it by its stable [`NodeId`].

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::chain::Chain;
use crate::config::SpecializeConfig;
use crate::error::NodeResult;
use crate::frame::Frame;
use crate::host::EvalContext;
use crate::op::BinaryOp;
use crate::rules;
use crate::value::Value;

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Stable identity of an operator node. A cloned tree keeps the ids of the
/// tree it was cloned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Allocate a process-unique id
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape transition reported to the tree observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeChange {
    /// A rule was installed; `depth` is the new number of entries
    Specialized {
        rule: &'static str,
        order: u16,
        depth: usize,
    },
    /// The chain closed; `depth` is the number of entries it had
    Generalized { depth: usize },
}

/// Binary operator node with a specialization chain
#[derive(Debug, Clone)]
pub struct BinaryOpNode {
    id: NodeId,
    left: Box<ExprNode>,
    right: Box<ExprNode>,
    chain: Chain,
}

impl BinaryOpNode {
    pub fn new(op: BinaryOp, left: ExprNode, right: ExprNode, config: &SpecializeConfig) -> Self {
        Self {
            id: NodeId::fresh(),
            left: Box::new(left),
            right: Box::new(right),
            chain: Chain::new(rules::for_op(op), config.max_chain_depth),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn op(&self) -> BinaryOp {
        self.chain.rule_set().op
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn left(&self) -> &ExprNode {
        &self.left
    }

    pub fn right(&self) -> &ExprNode {
        &self.right
    }

    /// Evaluate the left operand, then the right one, then apply the operator.
    pub fn evaluate(&mut self, frame: &Frame, cx: &EvalContext<'_>) -> NodeResult<Value> {
        let left = self.left.evaluate(frame, cx)?;
        let right = self.right.evaluate(frame, cx)?;
        self.chain.execute(self.id, &left, &right, frame, cx)
    }
}

/// Expression tree
#[derive(Debug, Clone)]
pub enum ExprNode {
    Literal(Value),
    /// Read of a frame slot
    Local(usize),
    Binary(BinaryOpNode),
}

impl ExprNode {
    pub fn literal<V: Into<Value>>(value: V) -> Self {
        ExprNode::Literal(value.into())
    }

    pub fn local(slot: usize) -> Self {
        ExprNode::Local(slot)
    }

    /// Operator node sized by the process-wide configuration
    pub fn binary(op: BinaryOp, left: ExprNode, right: ExprNode) -> Self {
        Self::binary_with(op, left, right, SpecializeConfig::global())
    }

    pub fn binary_with(
        op: BinaryOp,
        left: ExprNode,
        right: ExprNode,
        config: &SpecializeConfig,
    ) -> Self {
        ExprNode::Binary(BinaryOpNode::new(op, left, right, config))
    }

    pub fn evaluate(&mut self, frame: &Frame, cx: &EvalContext<'_>) -> NodeResult<Value> {
        match self {
            ExprNode::Literal(value) => Ok(value.clone()),
            ExprNode::Local(slot) => Ok(frame.read(*slot).clone()),
            ExprNode::Binary(node) => node.evaluate(frame, cx),
        }
    }

    pub fn as_binary(&self) -> Option<&BinaryOpNode> {
        match self {
            ExprNode::Binary(node) => Some(node),
            _ => None,
        }
    }
}
