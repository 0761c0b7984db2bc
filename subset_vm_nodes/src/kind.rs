//! Kind classification of runtime values.

use std::fmt;

use crate::value::Value;

/// Closed classification of a value's runtime representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    SmallInt,
    BigInt,
    Float,
    Complex,
    Str,
    Sequence,
    GenericObject,
}

impl Kind {
    /// Classify a value. Total and O(1).
    #[inline]
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::SmallInt(_) => Kind::SmallInt,
            Value::BigInt(_) => Kind::BigInt,
            Value::Float(_) => Kind::Float,
            Value::Complex(_) => Kind::Complex,
            Value::Str(_) => Kind::Str,
            Value::Sequence(_) => Kind::Sequence,
            Value::Object(_) => Kind::GenericObject,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Kind::SmallInt | Kind::BigInt)
    }

    /// Every kind the rule tables know natively; only guest objects are not.
    pub fn is_fixed(self) -> bool {
        self != Kind::GenericObject
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::SmallInt => "SmallInt",
            Kind::BigInt => "BigInt",
            Kind::Float => "Float",
            Kind::Complex => "Complex",
            Kind::Str => "Str",
            Kind::Sequence => "Sequence",
            Kind::GenericObject => "GenericObject",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
