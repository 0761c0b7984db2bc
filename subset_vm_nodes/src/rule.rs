//! Rules: guarded, ordered transformations of an operand pair.
//!
//! A [`Rule`] is a row in a per-operator static table. Its [`Guard`] decides
//! applicability from the operand kinds (and optionally the values), its
//! [`Action`] produces the result. Rules never change after the table is
//! compiled; the `order` field is the only tie-break between rules whose
//! guards overlap.

use std::fmt;

use crate::error::RuleResult;
use crate::kind::Kind;
use crate::op::BinaryOp;
use crate::value::Value;

/// Pure compute function of a rule
pub type ComputeFn = fn(&Value, &Value) -> RuleResult<Value>;

/// Extra value-level condition of a guard
pub type ValuePredicate = fn(&Value, &Value) -> bool;

/// Kind pattern for one operand position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindMatch {
    /// Exactly this kind
    Exact(Kind),
    /// SmallInt or BigInt; small integers widen implicitly
    Integer,
    /// Any kind the tables know natively (everything but guest objects)
    Fixed,
    /// Any kind
    Any,
}

impl KindMatch {
    #[inline]
    pub fn matches(self, kind: Kind) -> bool {
        match self {
            KindMatch::Exact(k) => k == kind,
            KindMatch::Integer => kind.is_integer(),
            KindMatch::Fixed => kind.is_fixed(),
            KindMatch::Any => true,
        }
    }
}

impl fmt::Display for KindMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindMatch::Exact(k) => write!(f, "{}", k),
            KindMatch::Integer => write!(f, "Integer"),
            KindMatch::Fixed => write!(f, "Fixed"),
            KindMatch::Any => write!(f, "Any"),
        }
    }
}

/// Applicability test of a rule
#[derive(Clone, Copy)]
pub enum Guard {
    /// Kind patterns for both operands, plus an optional value predicate
    Kinds {
        left: KindMatch,
        right: KindMatch,
        when: Option<(&'static str, ValuePredicate)>,
    },
    /// Either operand is a guest object
    EitherObject,
    /// Matches everything
    Always,
}

impl Guard {
    /// Exact kind pair
    pub const fn pair(left: Kind, right: Kind) -> Guard {
        Guard::Kinds {
            left: KindMatch::Exact(left),
            right: KindMatch::Exact(right),
            when: None,
        }
    }

    /// Exact kind pair with a named value predicate
    pub const fn pair_when(
        left: Kind,
        right: Kind,
        name: &'static str,
        predicate: ValuePredicate,
    ) -> Guard {
        Guard::Kinds {
            left: KindMatch::Exact(left),
            right: KindMatch::Exact(right),
            when: Some((name, predicate)),
        }
    }

    /// Arbitrary kind patterns
    pub const fn kinds(left: KindMatch, right: KindMatch) -> Guard {
        Guard::Kinds {
            left,
            right,
            when: None,
        }
    }

    /// Both operands integers of any width
    pub const fn integers() -> Guard {
        Guard::kinds(KindMatch::Integer, KindMatch::Integer)
    }

    #[inline]
    pub fn matches(&self, left_kind: Kind, right_kind: Kind, left: &Value, right: &Value) -> bool {
        match self {
            Guard::Kinds {
                left: lm,
                right: rm,
                when,
            } => {
                lm.matches(left_kind)
                    && rm.matches(right_kind)
                    && when.map_or(true, |(_, predicate)| predicate(left, right))
            }
            Guard::EitherObject => {
                left_kind == Kind::GenericObject || right_kind == Kind::GenericObject
            }
            Guard::Always => true,
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Kinds { left, right, when } => {
                write!(f, "({}, {})", left, right)?;
                if let Some((name, _)) = when {
                    write!(f, " if {}", name)?;
                }
                Ok(())
            }
            Guard::EitherObject => write!(f, "either GenericObject"),
            Guard::Always => write!(f, "always"),
        }
    }
}

/// What a rule does once its guard matched
#[derive(Clone, Copy)]
pub enum Action {
    /// Pure (or overflow-signalling) computation
    Compute(ComputeFn),
    /// Forward to the object model's operator protocol
    Protocol,
    /// Terminal catch-all: the operator is undefined for these operands
    Unsupported,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Compute(_) => write!(f, "Compute"),
            Action::Protocol => write!(f, "Protocol"),
            Action::Unsupported => write!(f, "Unsupported"),
        }
    }
}

/// One row of an operator's rule table
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Global position; lower orders are tried first
    pub order: u16,
    /// Short name for logs and diagnostics
    pub name: &'static str,
    pub guard: Guard,
    pub action: Action,
}

impl Rule {
    pub const fn compute(order: u16, name: &'static str, guard: Guard, f: ComputeFn) -> Rule {
        Rule {
            order,
            name,
            guard,
            action: Action::Compute(f),
        }
    }

    pub const fn protocol(order: u16) -> Rule {
        Rule {
            order,
            name: "protocol",
            guard: Guard::EitherObject,
            action: Action::Protocol,
        }
    }

    pub const fn unsupported(order: u16) -> Rule {
        Rule {
            order,
            name: "unsupported",
            guard: Guard::Always,
            action: Action::Unsupported,
        }
    }

    /// Whether the rule may be installed in a chain. The catch-all matches
    /// every shape, so installing it would shadow later specializations.
    pub fn is_installable(&self) -> bool {
        !matches!(self.action, Action::Unsupported)
    }

    #[inline]
    pub fn matches(&self, left_kind: Kind, right_kind: Kind, left: &Value, right: &Value) -> bool {
        self.guard.matches(left_kind, right_kind, left, right)
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.name == other.name
    }
}

/// The statically declared, order-sorted rules of one operator
#[derive(Debug)]
pub struct RuleSet {
    pub op: BinaryOp,
    pub rules: &'static [Rule],
}

impl RuleSet {
    /// Rule with the given order, if declared
    pub fn get(&self, order: u16) -> Option<&'static Rule> {
        self.rules
            .binary_search_by_key(&order, |r| r.order)
            .ok()
            .map(|i| &self.rules[i])
    }

    /// First declared rule whose guard matches, ignoring `skip`
    pub fn first_match(
        &self,
        left: &Value,
        right: &Value,
        skip: &[u16],
    ) -> Option<&'static Rule> {
        let (lk, rk) = (Kind::of(left), Kind::of(right));
        self.rules
            .iter()
            .find(|r| !skip.contains(&r.order) && r.matches(lk, rk, left, right))
    }

    /// Check the table is strictly ascending by order.
    pub fn is_well_ordered(&self) -> bool {
        self.rules.windows(2).all(|w| w[0].order < w[1].order)
    }

    /// One line per rule: `order name guard`
    pub fn describe(&self) -> String {
        self.rules
            .iter()
            .map(|r| format!("{:>3} {} {}", r.order, r.name, r.guard))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
