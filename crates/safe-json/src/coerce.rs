//! Typed reads of a single node.
//!
//! Every function inspects one `Value` and either converts it or reports a
//! [`JsonError::TypeMismatch`]. Numbers coerce between float and integer
//! targets as long as the conversion is lossless.

use serde_json::{Map, Number, Value};

use crate::error::{JsonError, JsonResult};

/// 2^63, the first `f64` outside the `i64` range.
const I64_END: f64 = 9_223_372_036_854_775_808.0;
/// 2^64, the first `f64` outside the `u64` range.
const U64_END: f64 = 18_446_744_073_709_551_616.0;

pub fn object(value: &Value) -> JsonResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        other => Err(JsonError::mismatch("object", other)),
    }
}

pub fn array(value: &Value) -> JsonResult<Vec<Value>> {
    match value {
        Value::Array(arr) => Ok(arr.clone()),
        other => Err(JsonError::mismatch("array", other)),
    }
}

pub fn boolean(value: &Value) -> JsonResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(JsonError::mismatch("bool", other)),
    }
}

pub fn string(value: &Value) -> JsonResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(JsonError::mismatch("string", other)),
    }
}

pub fn bytes(value: &Value) -> JsonResult<Vec<u8>> {
    match value {
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        other => Err(JsonError::mismatch("bytes", other)),
    }
}

/// Array of strings; `null` elements read as the empty string.
pub fn string_array(value: &Value) -> JsonResult<Vec<String>> {
    let Value::Array(arr) = value else {
        return Err(JsonError::mismatch("string array", value));
    };
    arr.iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Ok(String::new()),
            other => Err(JsonError::mismatch("string array", other)),
        })
        .collect()
}

/// Any float, or an integer that `f64` represents exactly.
pub fn float64(value: &Value) -> JsonResult<f64> {
    let n = number(value, "float64")?;
    let f = n
        .as_f64()
        .ok_or_else(|| JsonError::mismatch("float64", value))?;
    let exact = match (n.as_u64(), n.as_i64()) {
        (Some(u), _) => f < U64_END && f as u64 == u,
        (None, Some(i)) => f >= -I64_END && f < I64_END && f as i64 == i,
        (None, None) => true,
    };
    if exact {
        Ok(f)
    } else {
        Err(JsonError::mismatch("float64", value))
    }
}

pub fn int64(value: &Value) -> JsonResult<i64> {
    let n = number(value, "int64")?;
    let out = if n.is_f64() {
        n.as_f64()
            .filter(|f| is_integral(*f) && *f >= -I64_END && *f < I64_END)
            .map(|f| f as i64)
    } else {
        n.as_i64()
    };
    out.ok_or_else(|| JsonError::mismatch("int64", value))
}

pub fn uint64(value: &Value) -> JsonResult<u64> {
    let n = number(value, "uint64")?;
    let out = if n.is_f64() {
        n.as_f64()
            .filter(|f| is_integral(*f) && *f >= 0.0 && *f < U64_END)
            .map(|f| f as u64)
    } else {
        n.as_u64()
    };
    out.ok_or_else(|| JsonError::mismatch("uint64", value))
}

/// Machine-word integer.
pub fn int(value: &Value) -> JsonResult<isize> {
    let wide = int64(value).map_err(|_| JsonError::mismatch("int", value))?;
    isize::try_from(wide).map_err(|_| JsonError::mismatch("int", value))
}

fn number<'a>(value: &'a Value, expected: &'static str) -> JsonResult<&'a Number> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(JsonError::mismatch(expected, other)),
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}
