//! Specialization chain of one operator node.
//!
//! A chain starts `Open` with no entries. Each call first tries the installed
//! entries; when none applies, the operator's full rule table is scanned and
//! the first matching rule is run and installed at its ordered position.
//! Once the chain is full, or the operands are only covered by the catch-all,
//! the chain closes for good and every later call takes the generic path.
//!
//! A fixed-width rule that overflows cedes for the rest of the call: it is
//! skipped on every further scan of that call, so the same operands reach the
//! next wider rule.

use crate::dispatch;
use crate::error::{NodeResult, Signal, StructuralViolation};
use crate::frame::Frame;
use crate::host::EvalContext;
use crate::kind::Kind;
use crate::node::{NodeId, ShapeChange};
use crate::rule::{Rule, RuleSet};
use crate::value::Value;

/// Shape of a chain
#[derive(Debug, Clone)]
pub enum ChainState {
    /// Installed rules, strictly ascending by order
    Open(Vec<&'static Rule>),
    /// Terminal: every call runs the generic path
    ClosedGeneric,
}

/// Counters for tests and diagnostics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChainStats {
    /// Calls answered by an installed entry
    pub hits: u64,
    /// Rules installed
    pub installs: u64,
    /// Calls answered by the generic path
    pub generic_dispatches: u64,
    /// Times a rule ceded on overflow
    pub overflows: u64,
}

/// Result of scanning the installed entries
enum EntryScan {
    Done(NodeResult<Value>),
    Miss(Vec<u16>),
}

#[derive(Debug, Clone)]
pub struct Chain {
    rules: &'static RuleSet,
    max_depth: usize,
    state: ChainState,
    stats: ChainStats,
}

impl Chain {
    pub fn new(rules: &'static RuleSet, max_depth: usize) -> Self {
        Self {
            rules,
            max_depth,
            state: ChainState::Open(Vec::new()),
            stats: ChainStats::default(),
        }
    }

    pub fn rule_set(&self) -> &'static RuleSet {
        self.rules
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn stats(&self) -> ChainStats {
        self.stats
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, ChainState::ClosedGeneric)
    }

    /// Installed entries; empty once closed
    pub fn entries(&self) -> &[&'static Rule] {
        match &self.state {
            ChainState::Open(entries) => entries,
            ChainState::ClosedGeneric => &[],
        }
    }

    /// Orders of the installed entries, in chain order
    pub fn installed_orders(&self) -> Vec<u16> {
        self.entries().iter().map(|r| r.order).collect()
    }

    pub fn depth(&self) -> usize {
        self.entries().len()
    }

    /// Evaluate `left <op> right`, specializing the chain as needed.
    ///
    /// # Panics
    ///
    /// Panics if a transition leaves the chain structurally invalid.
    pub fn execute(
        &mut self,
        node: NodeId,
        left: &Value,
        right: &Value,
        frame: &Frame,
        cx: &EvalContext<'_>,
    ) -> NodeResult<Value> {
        if self.is_closed() {
            return self.run_generic(left, right, frame, cx);
        }

        let mut ceded = match self.scan_entries(left, right, frame, cx) {
            EntryScan::Done(result) => {
                self.stats.hits += 1;
                return result;
            }
            EntryScan::Miss(ceded) => ceded,
        };

        while let Some(rule) = self.rules.first_match(left, right, &ceded) {
            if !rule.is_installable() || self.depth() >= self.max_depth {
                break;
            }
            match dispatch::invoke(self.rules, rule, left, right, frame, cx) {
                Err(Signal::Overflow) => {
                    self.note_overflow(rule, left, right);
                    ceded.push(rule.order);
                }
                Err(Signal::Raise(err)) => {
                    self.install(node, rule, cx);
                    return Err(err);
                }
                Ok(value) => {
                    self.install(node, rule, cx);
                    return Ok(value);
                }
            }
        }

        self.close(node, cx);
        self.run_generic(left, right, frame, cx)
    }

    fn scan_entries(
        &mut self,
        left: &Value,
        right: &Value,
        frame: &Frame,
        cx: &EvalContext<'_>,
    ) -> EntryScan {
        let (lk, rk) = (Kind::of(left), Kind::of(right));
        let mut ceded = Vec::new();
        let ChainState::Open(entries) = &self.state else {
            return EntryScan::Miss(ceded);
        };
        for &rule in entries {
            if !rule.matches(lk, rk, left, right) {
                continue;
            }
            match dispatch::invoke(self.rules, rule, left, right, frame, cx) {
                Ok(value) => return EntryScan::Done(Ok(value)),
                Err(Signal::Raise(err)) => return EntryScan::Done(Err(err)),
                Err(Signal::Overflow) => {
                    self.stats.overflows += 1;
                    log::trace!(
                        "{}: rule {} overflowed on ({}, {}), ceding",
                        self.rules.op,
                        rule.name,
                        lk,
                        rk
                    );
                    ceded.push(rule.order);
                }
            }
        }
        EntryScan::Miss(ceded)
    }

    fn run_generic(
        &mut self,
        left: &Value,
        right: &Value,
        frame: &Frame,
        cx: &EvalContext<'_>,
    ) -> NodeResult<Value> {
        self.stats.generic_dispatches += 1;
        dispatch::generic_execute(self.rules, left, right, frame, cx)
    }

    fn note_overflow(&mut self, rule: &Rule, left: &Value, right: &Value) {
        self.stats.overflows += 1;
        log::trace!(
            "{}: rule {} overflowed on ({}, {}), ceding",
            self.rules.op,
            rule.name,
            Kind::of(left),
            Kind::of(right)
        );
    }

    fn install(&mut self, node: NodeId, rule: &'static Rule, cx: &EvalContext<'_>) {
        let ChainState::Open(entries) = &mut self.state else {
            return;
        };
        let at = entries.partition_point(|e| e.order < rule.order);
        entries.insert(at, rule);
        let depth = entries.len();
        self.stats.installs += 1;

        log::debug!(
            "node {} ({}): installed rule {} (order {}), depth {}/{}",
            node,
            self.rules.op,
            rule.name,
            rule.order,
            depth,
            self.max_depth
        );
        cx.observer.shape_changed(
            node,
            &ShapeChange::Specialized {
                rule: rule.name,
                order: rule.order,
                depth,
            },
        );
        self.assert_valid(node);
    }

    fn close(&mut self, node: NodeId, cx: &EvalContext<'_>) {
        let depth = self.depth();
        self.state = ChainState::ClosedGeneric;

        log::debug!(
            "node {} ({}): closed to generic at depth {}",
            node,
            self.rules.op,
            depth
        );
        cx.observer
            .shape_changed(node, &ShapeChange::Generalized { depth });
        self.assert_valid(node);
    }

    fn assert_valid(&self, node: NodeId) {
        if let Err(violation) = self.verify(node) {
            panic!("{}", violation);
        }
    }

    /// Check the chain invariants: bounded depth, strictly ascending orders,
    /// every entry from this operator's table, no catch-all installed.
    pub fn verify(&self, node: NodeId) -> Result<(), StructuralViolation> {
        let violation = |reason: String| StructuralViolation {
            node: node.as_u32(),
            reason,
        };
        let ChainState::Open(entries) = &self.state else {
            return Ok(());
        };
        if entries.len() > self.max_depth {
            return Err(violation(format!(
                "{} entries exceed max depth {}",
                entries.len(),
                self.max_depth
            )));
        }
        if let Some(w) = entries.windows(2).find(|w| w[0].order >= w[1].order) {
            return Err(violation(format!(
                "entries out of order: {} before {}",
                w[0].order, w[1].order
            )));
        }
        for entry in entries {
            if self.rules.get(entry.order) != Some(*entry) {
                return Err(violation(format!(
                    "rule {} (order {}) is not in the {} table",
                    entry.name, entry.order, self.rules.op
                )));
            }
            if !entry.is_installable() {
                return Err(violation(format!("catch-all rule {} installed", entry.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeError;
    use crate::host::NoopObserver;
    use crate::rules::{ADD, MOD};

    fn run(chain: &mut Chain, l: Value, r: Value) -> NodeResult<Value> {
        chain.execute(
            NodeId::fresh(),
            &l,
            &r,
            &Frame::default(),
            &EvalContext::detached(),
        )
    }

    #[test]
    fn test_first_call_installs() {
        let mut chain = Chain::new(&ADD, 5);
        assert_eq!(chain.depth(), 0);
        assert_eq!(run(&mut chain, Value::SmallInt(1), Value::SmallInt(2)), Ok(Value::SmallInt(3)));
        assert_eq!(chain.installed_orders(), vec![5]);
        assert_eq!(run(&mut chain, Value::SmallInt(3), Value::SmallInt(4)), Ok(Value::SmallInt(7)));
        assert_eq!(chain.stats().hits, 1);
        assert_eq!(chain.stats().installs, 1);
    }

    #[test]
    fn test_overflow_installs_wider_rule() {
        let mut chain = Chain::new(&ADD, 5);
        run(&mut chain, Value::SmallInt(1), Value::SmallInt(2)).unwrap();
        let out = run(&mut chain, Value::SmallInt(i32::MAX), Value::SmallInt(1));
        assert_eq!(out, Ok(Value::int(2147483648)));
        assert_eq!(chain.installed_orders(), vec![5, 8]);
        assert_eq!(chain.stats().overflows, 1);
    }

    #[test]
    fn test_overflow_on_empty_chain() {
        let mut chain = Chain::new(&ADD, 5);
        let out = run(&mut chain, Value::SmallInt(i32::MAX), Value::SmallInt(1));
        assert_eq!(out, Ok(Value::int(2147483648)));
        assert_eq!(chain.installed_orders(), vec![8]);
    }

    #[test]
    fn test_entries_inserted_in_order() {
        let mut chain = Chain::new(&ADD, 5);
        run(&mut chain, Value::Float(1.0), Value::Float(2.0)).unwrap();
        run(&mut chain, Value::from("a"), Value::from("b")).unwrap();
        run(&mut chain, Value::SmallInt(1), Value::SmallInt(2)).unwrap();
        assert_eq!(chain.installed_orders(), vec![5, 14, 30]);

        let mut chain = Chain::new(&MOD, 5);
        run(&mut chain, Value::SmallInt(-1), Value::SmallInt(3)).unwrap();
        run(&mut chain, Value::SmallInt(7), Value::SmallInt(3)).unwrap();
        run(&mut chain, Value::SmallInt(7), Value::SmallInt(-3)).unwrap();
        assert_eq!(chain.installed_orders(), vec![0, 1, 5]);
        assert!(chain.verify(NodeId::fresh()).is_ok());
    }

    #[test]
    fn test_catch_all_closes_chain() {
        let mut chain = Chain::new(&ADD, 5);
        run(&mut chain, Value::SmallInt(1), Value::SmallInt(2)).unwrap();
        let err = run(&mut chain, Value::from("a"), Value::SmallInt(1)).unwrap_err();
        assert!(err.is_type_error());
        assert!(chain.is_closed());
        assert_eq!(chain.depth(), 0);
        assert_eq!(run(&mut chain, Value::SmallInt(1), Value::SmallInt(2)), Ok(Value::SmallInt(3)));
        assert_eq!(chain.stats().generic_dispatches, 2);
    }

    #[test]
    fn test_raising_rule_is_installed() {
        let mut chain = Chain::new(&MOD, 5);
        let err = run(&mut chain, Value::SmallInt(1), Value::SmallInt(0)).unwrap_err();
        assert!(matches!(err, NodeError::ZeroDivision(_)));
        assert_eq!(chain.installed_orders(), vec![5]);
    }

    #[test]
    fn test_depth_one_chain() {
        let mut chain = Chain::new(&ADD, 1);
        run(&mut chain, Value::SmallInt(1), Value::SmallInt(2)).unwrap();
        assert!(!chain.is_closed());
        assert_eq!(
            run(&mut chain, Value::Float(1.0), Value::Float(2.0)),
            Ok(Value::Float(3.0))
        );
        assert!(chain.is_closed());
    }

    #[test]
    fn test_verify_detects_disorder() {
        let mut chain = Chain::new(&ADD, 5);
        let (small, float) = (ADD.get(5).unwrap(), ADD.get(14).unwrap());
        chain.state = ChainState::Open(vec![float, small]);
        let err = chain.verify(NodeId::fresh()).unwrap_err();
        assert!(err.reason.contains("out of order"));

        chain.state = ChainState::Open(vec![ADD.get(1000).unwrap()]);
        assert!(chain.verify(NodeId::fresh()).is_err());

        chain.state = ChainState::Open(vec![MOD.get(0).unwrap()]);
        assert!(chain.verify(NodeId::fresh()).is_err());
    }

    #[test]
    #[should_panic(expected = "structural violation")]
    fn test_violation_aborts() {
        let mut chain = Chain::new(&ADD, 5);
        chain.state = ChainState::Open(vec![ADD.get(14).unwrap(), ADD.get(5).unwrap()]);
        let cx = EvalContext::new(&crate::host::NoObjectModel, &NoopObserver);
        let _ = chain.execute(
            NodeId::fresh(),
            &Value::from("a"),
            &Value::from("b"),
            &Frame::default(),
            &cx,
        );
    }
}
