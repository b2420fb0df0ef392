use serde_json::Value;

use super::value;

/// Signature shared by every template function. Errors are plain messages;
/// the renderer attaches the action's location.
pub type Helper = fn(&[Value]) -> Result<Value, String>;

/// The fixed function registry. Parse-time name resolution goes through
/// here, so there is no dynamic registration.
pub fn lookup(name: &str) -> Option<Helper> {
    match name {
        "slice" => Some(slice),
        "len" => Some(len),
        "index" => Some(index),
        "eq" => Some(eq),
        "ne" => Some(ne),
        "not" => Some(not),
        "and" => Some(and),
        "or" => Some(or),
        _ => None,
    }
}

/// Collects its arguments, of any type, into an array
fn slice(args: &[Value]) -> Result<Value, String> {
    Ok(Value::Array(args.to_vec()))
}

fn len(args: &[Value]) -> Result<Value, String> {
    if args.len() != 1 {
        return Err(format!("len expects 1 argument, got {}", args.len()));
    }
    match &args[0] {
        Value::String(s) => Ok(Value::from(s.len())),
        Value::Array(a) => Ok(Value::from(a.len())),
        Value::Object(m) => Ok(Value::from(m.len())),
        v => Err(format!("len of {}", value::type_name(v))),
    }
}

/// Successive indexing: arrays by number, objects by key. A missing object
/// key yields null; an out-of-range array index is an error.
fn index(args: &[Value]) -> Result<Value, String> {
    if args.is_empty() {
        return Err("index expects at least 1 argument".to_string());
    }
    let mut current = &args[0];
    for key in &args[1..] {
        current = match (current, key) {
            (Value::Array(a), Value::Number(n)) => {
                let i = n
                    .as_u64()
                    .ok_or_else(|| format!("bad array index {}", n))?;
                a.get(i as usize)
                    .ok_or_else(|| format!("array index {} out of range", i))?
            }
            (Value::Object(m), Value::String(k)) => m.get(k).unwrap_or(&Value::Null),
            (v, k) => {
                return Err(format!(
                    "can't index {} with {}",
                    value::type_name(v),
                    value::type_name(k)
                ))
            }
        };
    }
    Ok(current.clone())
}

/// True when the first argument equals any of the rest
fn eq(args: &[Value]) -> Result<Value, String> {
    if args.len() < 2 {
        return Err(format!("eq expects at least 2 arguments, got {}", args.len()));
    }
    let first = &args[0];
    Ok(Value::Bool(args[1..].iter().any(|v| value::equal(first, v))))
}

fn ne(args: &[Value]) -> Result<Value, String> {
    if args.len() != 2 {
        return Err(format!("ne expects 2 arguments, got {}", args.len()));
    }
    Ok(Value::Bool(!value::equal(&args[0], &args[1])))
}

fn not(args: &[Value]) -> Result<Value, String> {
    if args.len() != 1 {
        return Err(format!("not expects 1 argument, got {}", args.len()));
    }
    Ok(Value::Bool(!value::is_true(&args[0])))
}

/// Returns the first falsy argument, or the last one
fn and(args: &[Value]) -> Result<Value, String> {
    if args.is_empty() {
        return Err("and expects at least 1 argument".to_string());
    }
    for v in args {
        if !value::is_true(v) {
            return Ok(v.clone());
        }
    }
    Ok(args[args.len() - 1].clone())
}

/// Returns the first truthy argument, or the last one
fn or(args: &[Value]) -> Result<Value, String> {
    if args.is_empty() {
        return Err("or expects at least 1 argument".to_string());
    }
    for v in args {
        if value::is_true(v) {
            return Ok(v.clone());
        }
    }
    Ok(args[args.len() - 1].clone())
}
