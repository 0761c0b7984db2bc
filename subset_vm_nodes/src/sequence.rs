//! List and tuple values with storage strategies
//!
//! A list whose elements are all small integers keeps them unboxed in
//! `SequenceStorage::Int`; anything else uses boxed `Value`s. The storage
//! strategy is what the `+` rules guard on to pick an in-place extend of a
//! homogeneous copy over a generic concatenation.

use std::fmt;

use crate::value::Value;

/// Whether a sequence is a list or a tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    List,
    Tuple,
}

/// Storage strategy
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceStorage {
    /// Homogeneous small integers, unboxed
    Int(Vec<i32>),
    /// Dynamic values (fallback)
    Object(Vec<Value>),
}

impl SequenceStorage {
    /// Pick the narrowest storage able to hold `values`.
    fn specialize(values: Vec<Value>) -> Self {
        if values.is_empty() {
            return SequenceStorage::Object(values);
        }
        let ints: Option<Vec<i32>> = values.iter().map(Value::as_small_int).collect();
        match ints {
            Some(ints) => SequenceStorage::Int(ints),
            None => SequenceStorage::Object(values),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SequenceStorage::Int(v) => v.len(),
            SequenceStorage::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append every element of `other`, generalizing to object storage when
    /// the strategies differ.
    pub fn extend(&mut self, other: &SequenceStorage) {
        match (&mut *self, other) {
            (SequenceStorage::Int(a), SequenceStorage::Int(b)) => a.extend_from_slice(b),
            (SequenceStorage::Object(a), SequenceStorage::Object(b)) => a.extend_from_slice(b),
            (SequenceStorage::Object(a), SequenceStorage::Int(b)) => {
                a.extend(b.iter().map(|v| Value::SmallInt(*v)))
            }
            (SequenceStorage::Int(a), SequenceStorage::Object(b)) => {
                let mut values: Vec<Value> = a.iter().map(|v| Value::SmallInt(*v)).collect();
                values.extend_from_slice(b);
                *self = SequenceStorage::Object(values);
            }
        }
    }
}

/// List or tuple value
#[derive(Debug, Clone)]
pub struct Sequence {
    kind: SequenceKind,
    storage: SequenceStorage,
}

impl Sequence {
    /// Create a list, specializing its storage to the elements.
    pub fn list(values: Vec<Value>) -> Self {
        Sequence {
            kind: SequenceKind::List,
            storage: SequenceStorage::specialize(values),
        }
    }

    /// Create a tuple. Tuples always use object storage.
    pub fn tuple(values: Vec<Value>) -> Self {
        Sequence {
            kind: SequenceKind::Tuple,
            storage: SequenceStorage::Object(values),
        }
    }

    pub fn with_storage(kind: SequenceKind, storage: SequenceStorage) -> Self {
        Sequence { kind, storage }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn storage(&self) -> &SequenceStorage {
        &self.storage
    }

    pub fn is_list(&self) -> bool {
        self.kind == SequenceKind::List
    }

    pub fn is_tuple(&self) -> bool {
        self.kind == SequenceKind::Tuple
    }

    pub fn has_int_storage(&self) -> bool {
        matches!(self.storage, SequenceStorage::Int(_))
    }

    pub fn has_object_storage(&self) -> bool {
        matches!(self.storage, SequenceStorage::Object(_))
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// All elements, boxed
    pub fn to_values(&self) -> Vec<Value> {
        match &self.storage {
            SequenceStorage::Int(v) => v.iter().map(|x| Value::SmallInt(*x)).collect(),
            SequenceStorage::Object(v) => v.clone(),
        }
    }

    /// Copy of `self` extended in place with `other`'s storage. Keeps the
    /// strategy when both sides share it.
    pub fn extended(&self, other: &Sequence) -> Sequence {
        let mut storage = self.storage.clone();
        storage.extend(&other.storage);
        Sequence {
            kind: self.kind,
            storage,
        }
    }

    /// Generic concatenation: boxes both sides and re-specializes the result.
    pub fn concat(&self, other: &Sequence) -> Sequence {
        let mut values = self.to_values();
        values.extend(other.to_values());
        match self.kind {
            SequenceKind::List => Sequence::list(values),
            SequenceKind::Tuple => Sequence::tuple(values),
        }
    }

    /// `count` copies of the sequence; non-positive counts give an empty one.
    pub fn repeat(&self, count: i64) -> Sequence {
        let n = if self.is_empty() {
            0
        } else {
            usize::try_from(count).unwrap_or(0)
        };
        let storage = match &self.storage {
            SequenceStorage::Int(v) => SequenceStorage::Int(v.repeat(n)),
            SequenceStorage::Object(v) => {
                let mut out = Vec::with_capacity(v.len() * n);
                for _ in 0..n {
                    out.extend_from_slice(v);
                }
                SequenceStorage::Object(out)
            }
        };
        Sequence {
            kind: self.kind,
            storage,
        }
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind || self.len() != other.len() {
            return false;
        }
        match (&self.storage, &other.storage) {
            (SequenceStorage::Int(a), SequenceStorage::Int(b)) => a == b,
            _ => self.to_values() == other.to_values(),
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.kind {
            SequenceKind::List => ("[", "]"),
            SequenceKind::Tuple => ("(", ")"),
        };
        write!(f, "{}", open)?;
        for (i, v) in self.to_values().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        if self.kind == SequenceKind::Tuple && self.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, "{}", close)
    }
}
