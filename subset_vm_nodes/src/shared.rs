//! Operator node whose chain is shared between threads.
//!
//! The chain sits behind a `parking_lot::Mutex`, held for the whole
//! scan-invoke-install sequence of a call. The lock is not re-entrant: a
//! protocol method must not evaluate the same shared node again.

use parking_lot::Mutex;

use crate::chain::{Chain, ChainStats};
use crate::config::SpecializeConfig;
use crate::error::NodeResult;
use crate::frame::Frame;
use crate::host::EvalContext;
use crate::node::NodeId;
use crate::op::BinaryOp;
use crate::rules;
use crate::value::Value;

#[derive(Debug)]
pub struct SharedBinaryOp {
    id: NodeId,
    op: BinaryOp,
    chain: Mutex<Chain>,
}

impl SharedBinaryOp {
    pub fn new(op: BinaryOp, config: &SpecializeConfig) -> Self {
        Self {
            id: NodeId::fresh(),
            op,
            chain: Mutex::new(Chain::new(rules::for_op(op), config.max_chain_depth)),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn op(&self) -> BinaryOp {
        self.op
    }

    pub fn execute(
        &self,
        left: &Value,
        right: &Value,
        frame: &Frame,
        cx: &EvalContext<'_>,
    ) -> NodeResult<Value> {
        self.chain.lock().execute(self.id, left, right, frame, cx)
    }

    pub fn installed_orders(&self) -> Vec<u16> {
        self.chain.lock().installed_orders()
    }

    pub fn is_closed(&self) -> bool {
        self.chain.lock().is_closed()
    }

    pub fn stats(&self) -> ChainStats {
        self.chain.lock().stats()
    }
}
