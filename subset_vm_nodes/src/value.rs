//! Dynamic Value type for operator nodes
//!
//! Values are immutable once built. Heap payloads sit behind `Arc` so that a
//! whole syntax tree, constants included, can be cloned into another thread.

use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::ToPrimitive;

use crate::sequence::{Sequence, SequenceKind};

/// Dynamic value of the guest language
#[derive(Debug, Clone)]
pub enum Value {
    // ========== Numeric Types ==========
    /// Fixed-width integer; the fast path for integer arithmetic
    SmallInt(i32),
    /// Arbitrary-precision integer; never holds a value that fits `i32`
    BigInt(BigInt),
    /// 64-bit floating point
    Float(f64),
    /// Complex number with 64-bit float parts
    Complex(Complex64),

    // ========== Heap-Allocated Types ==========
    /// String
    Str(String),
    /// List or tuple
    Sequence(Arc<Sequence>),
    /// Instance of a guest class, interpreted by the object model
    Object(Arc<GuestObject>),
}

/// Instance of a user-defined guest class
#[derive(Debug, Clone, PartialEq)]
pub struct GuestObject {
    /// Class name, used for error messages and protocol lookup
    pub class_name: String,
    /// Field values in declaration order
    pub fields: Vec<(String, Value)>,
}

impl GuestObject {
    pub fn new<S: Into<String>>(class_name: S) -> Self {
        GuestObject {
            class_name: class_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field<S: Into<String>>(mut self, name: S, value: Value) -> Self {
        self.fields.push((name.into(), value));
        self
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl Value {
    /// Integer in canonical form: `SmallInt` when it fits in `i32`.
    pub fn int(v: i64) -> Value {
        match i32::try_from(v) {
            Ok(small) => Value::SmallInt(small),
            Err(_) => Value::BigInt(BigInt::from(v)),
        }
    }

    /// Canonicalize an arbitrary-precision integer.
    pub fn from_bigint(v: BigInt) -> Value {
        match v.to_i32() {
            Some(small) => Value::SmallInt(small),
            None => Value::BigInt(v),
        }
    }

    pub fn complex(re: f64, im: f64) -> Value {
        Value::Complex(Complex64::new(re, im))
    }

    pub fn list(values: Vec<Value>) -> Value {
        Value::Sequence(Arc::new(Sequence::list(values)))
    }

    pub fn tuple(values: Vec<Value>) -> Value {
        Value::Sequence(Arc::new(Sequence::tuple(values)))
    }

    pub fn object(object: GuestObject) -> Value {
        Value::Object(Arc::new(object))
    }

    /// Get the guest type name of this value
    pub fn type_name(&self) -> &str {
        match self {
            Value::SmallInt(_) | Value::BigInt(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
            Value::Str(_) => "str",
            Value::Sequence(seq) => match seq.kind() {
                SequenceKind::List => "list",
                SequenceKind::Tuple => "tuple",
            },
            Value::Object(obj) => &obj.class_name,
        }
    }

    /// Try to extract as i32
    pub fn as_small_int(&self) -> Option<i32> {
        match self {
            Value::SmallInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to extract as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&GuestObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// String form used by `%s` formatting: strings unquoted, everything
    /// else as displayed.
    pub fn to_str_form(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// ========== From implementations ==========

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::SmallInt(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::int(v)
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::from_bigint(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Complex64> for Value {
    fn from(v: Complex64) -> Self {
        Value::Complex(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Sequence> for Value {
    fn from(v: Sequence) -> Self {
        Value::Sequence(Arc::new(v))
    }
}

// ========== Display implementation ==========

/// Float formatting in the guest's repr style.
/// Shortest round-trip repr; scientific outside `1e-4 <= |v| < 1e16`.
fn float_repr(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        let s = if v > 0.0 { "inf" } else { "-inf" };
        return s.to_string();
    }
    let abs = v.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        return scientific(v);
    }
    if v.fract() == 0.0 {
        format!("{}.0", v)
    } else {
        format!("{}", v)
    }
}

/// `1e16` as `1e+16`, `1.5e-7` as `1.5e-07`
fn scientific(v: f64) -> String {
    let s = format!("{:e}", v);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => s,
    }
}

fn fmt_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    f.write_str(&float_repr(v))
}

/// Complex part: integral parts drop the `.0`, like the guest does.
fn fmt_complex_part(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{}", v as i64)
    } else {
        float_repr(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Float(v) => fmt_float(f, *v),
            Value::Complex(c) => {
                if c.re == 0.0 && c.re.is_sign_positive() {
                    write!(f, "{}j", fmt_complex_part(c.im))
                } else {
                    let sign = if c.im.is_sign_negative() { "-" } else { "+" };
                    write!(
                        f,
                        "({}{}{}j)",
                        fmt_complex_part(c.re),
                        sign,
                        fmt_complex_part(c.im.abs())
                    )
                }
            }
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Sequence(seq) => write!(f, "{}", seq),
            Value::Object(obj) => write!(f, "<{} object>", obj.class_name),
        }
    }
}

// ========== PartialEq implementation ==========

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::SmallInt(a), Value::SmallInt(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Complex(a), Value::Complex(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            // Guest objects are compared by identity
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
