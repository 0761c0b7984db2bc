//! printf-style `%` formatting for `str % value`.

use std::fmt::Write;

use num_traits::ToPrimitive;

use crate::convert;
use crate::error::{NodeError, NodeResult};
use crate::value::Value;

/// Format `template` with `args`. A tuple supplies one argument per
/// conversion; any other value is a single argument.
pub fn percent_format(template: &str, args: &Value) -> NodeResult<String> {
    let values = match args.as_sequence() {
        Some(seq) if seq.is_tuple() => seq.to_values(),
        _ => vec![args.clone()],
    };
    let mut args = values.iter();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let conv = chars
            .next()
            .ok_or_else(|| NodeError::type_error("incomplete format"))?;
        if conv == '%' {
            out.push('%');
            continue;
        }
        let arg = args
            .next()
            .ok_or_else(|| NodeError::type_error("not enough arguments for format string"))?;
        match conv {
            's' => out.push_str(&arg.to_str_form()),
            'r' => {
                let _ = write!(out, "{}", arg);
            }
            'd' | 'i' => out.push_str(&format_integer(conv, arg)?),
            'f' => {
                let v = real_number(arg)?;
                let _ = write!(out, "{:.6}", v);
            }
            other => {
                return Err(NodeError::type_error(format!(
                    "unsupported format character '{}'",
                    other
                )))
            }
        }
    }

    if args.next().is_some() {
        return Err(NodeError::type_error(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(out)
}

fn format_integer(conv: char, arg: &Value) -> NodeResult<String> {
    match arg {
        Value::SmallInt(v) => Ok(v.to_string()),
        Value::BigInt(v) => Ok(v.to_string()),
        Value::Float(v) if v.is_finite() => Ok(match v.trunc().to_i64() {
            Some(i) => i.to_string(),
            None => format!("{:.0}", v.trunc()),
        }),
        Value::Float(v) => Err(NodeError::overflow_error(format!(
            "cannot convert float {} to integer",
            v
        ))),
        other => Err(NodeError::type_error(format!(
            "%{} format: a real number is required, not {}",
            conv,
            other.type_name()
        ))),
    }
}

fn real_number(arg: &Value) -> NodeResult<f64> {
    let v = match arg {
        Value::Complex(_) => None,
        other => convert::to_f64(other),
    };
    v.ok_or_else(|| NodeError::type_error(format!("must be real number, not {}", arg.type_name())))
}
