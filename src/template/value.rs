use serde_json::Value;

/// Truthiness used by `if`, `range` and the boolean functions: false, zero,
/// empty strings, empty collections and null are false.
pub fn is_true(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(m) => !m.is_empty(),
    }
}

/// Default string form of a rendered value: strings bare, arrays as
/// `[a b c]`, objects as `map[k:v]` with sorted keys, null as `<no value>`.
pub fn to_display(v: &Value) -> String {
    match v {
        Value::Null => "<no value>".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(to_display).collect();
            format!("[{}]", parts.join(" "))
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let parts: Vec<String> = keys
                .iter()
                .map(|k| format!("{}:{}", k, to_display(&map[k.as_str()])))
                .collect();
            format!("map[{}]", parts.join(" "))
        }
    }
}

/// Equality with numbers compared numerically, so 1 == 1.0
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_true() {
        assert!(!is_true(&json!(null)));
        assert!(!is_true(&json!(false)));
        assert!(!is_true(&json!(0)));
        assert!(!is_true(&json!("")));
        assert!(!is_true(&json!([])));
        assert!(!is_true(&json!({})));
        assert!(is_true(&json!(1)));
        assert!(is_true(&json!("x")));
        assert!(is_true(&json!([0])));
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(to_display(&json!("plain")), "plain");
        assert_eq!(to_display(&json!(42)), "42");
        assert_eq!(to_display(&json!(2.5)), "2.5");
        assert_eq!(to_display(&json!(true)), "true");
        assert_eq!(to_display(&json!(null)), "<no value>");
    }

    #[test]
    fn test_display_array() {
        assert_eq!(to_display(&json!([1, 2, 3])), "[1 2 3]");
        assert_eq!(to_display(&json!(["a", [1, 2]])), "[a [1 2]]");
    }

    #[test]
    fn test_display_object_sorts_keys() {
        assert_eq!(to_display(&json!({"b": 2, "a": 1})), "map[a:1 b:2]");
    }

    #[test]
    fn test_numeric_equality() {
        assert!(equal(&json!(1), &json!(1.0)));
        assert!(!equal(&json!(1), &json!("1")));
    }
}
