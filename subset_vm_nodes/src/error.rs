//! Error types for operator node evaluation
//!
//! `NodeError` is what crosses from a node back to the interpreter and is
//! surfaced as a guest-language exception. `Signal` is the internal channel a
//! rule uses to cede to a wider rule; it never leaves the rewrite engine.

use thiserror::Error;

use crate::op::BinaryOp;

/// User-visible error raised by an operator node
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeError {
    /// No rule, including the generic one, applies to the operand kinds
    #[error("TypeError: unsupported operand type(s) for {op}: '{left}' and '{right}'")]
    UnsupportedOperands {
        /// Operator symbol
        op: &'static str,
        /// Left operand type name
        left: String,
        /// Right operand type name
        right: String,
    },

    /// The object model found no protocol method for the operands
    #[error("TypeError: no method {method} for operands '{left}' and '{right}'")]
    NoProtocolMethod {
        /// Protocol method name (e.g. `__add__`)
        method: &'static str,
        /// Left operand type name
        left: String,
        /// Right operand type name
        right: String,
    },

    /// Any other type error (e.g. string formatting)
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Division or modulo by zero
    #[error("ZeroDivisionError: {0}")]
    ZeroDivision(String),

    /// Result cannot be represented
    #[error("OverflowError: {0}")]
    OverflowError(String),
}

impl NodeError {
    /// Create an unsupported-operands type error
    pub fn unsupported<L: Into<String>, R: Into<String>>(op: BinaryOp, left: L, right: R) -> Self {
        NodeError::UnsupportedOperands {
            op: op.symbol(),
            left: left.into(),
            right: right.into(),
        }
    }

    /// Create a missing-protocol-method type error
    pub fn no_protocol_method<L: Into<String>, R: Into<String>>(
        method: &'static str,
        left: L,
        right: R,
    ) -> Self {
        NodeError::NoProtocolMethod {
            method,
            left: left.into(),
            right: right.into(),
        }
    }

    /// Create a plain type error
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        NodeError::TypeError(msg.into())
    }

    /// Create a zero division error
    pub fn zero_division<S: Into<String>>(msg: S) -> Self {
        NodeError::ZeroDivision(msg.into())
    }

    /// Create an overflow error
    pub fn overflow_error<S: Into<String>>(msg: S) -> Self {
        NodeError::OverflowError(msg.into())
    }

    /// True for every variant the guest sees as a `TypeError`
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            NodeError::UnsupportedOperands { .. }
                | NodeError::NoProtocolMethod { .. }
                | NodeError::TypeError(_)
        )
    }
}

/// Result type alias for node evaluation
pub type NodeResult<T> = Result<T, NodeError>;

/// Outcome of a rule's compute function other than a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Fixed-width arithmetic overflowed; cede to the next wider rule.
    Overflow,
    /// Raise a user-visible error.
    Raise(NodeError),
}

impl From<NodeError> for Signal {
    fn from(err: NodeError) -> Self {
        Signal::Raise(err)
    }
}

/// Result type of a rule's compute function
pub type RuleResult<T> = Result<T, Signal>;

/// A chain invariant was broken. This is an implementation defect, not a
/// guest error, and aborts the interpreter instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("structural violation in node {node}: {reason}")]
pub struct StructuralViolation {
    /// Id of the offending node
    pub node: u32,
    /// What was broken
    pub reason: String,
}

/// Configuration loading error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML document could not be parsed
    #[error("invalid specialization config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `max_chain_depth` out of range
    #[error("max_chain_depth must be at least 1, got {0}")]
    InvalidDepth(usize),

    /// Environment override is not a number
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },
}
