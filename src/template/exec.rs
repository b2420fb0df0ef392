use crate::error::{GoatError, Location, Result};
use serde_json::Value;

use super::funcs;
use super::parser::{Expr, Node};
use super::value;

/// Render parsed nodes against the root data value. The whole output is
/// buffered; nothing is emitted on failure.
pub fn render(nodes: &[Node], root: &Value) -> Result<String> {
    let mut out = String::new();
    render_nodes(nodes, root, root, &mut out)?;
    Ok(out)
}

fn render_nodes(nodes: &[Node], root: &Value, dot: &Value, out: &mut String) -> Result<()> {
    for node in nodes {
        match node {
            Node::Text(s) => out.push_str(s),
            Node::Action { expr, location } => {
                let v = eval(expr, root, dot, location)?;
                out.push_str(&value::to_display(&v));
            }
            Node::If { cond, then, els, location } => {
                if value::is_true(&eval(cond, root, dot, location)?) {
                    render_nodes(then, root, dot, out)?;
                } else {
                    render_nodes(els, root, dot, out)?;
                }
            }
            Node::Range { expr, body, els, location } => {
                render_range(expr, body, els, location, root, dot, out)?;
            }
        }
    }
    Ok(())
}

/// Iterate an array (dot becomes the element) or an object in sorted key
/// order (dot becomes the value); the else branch runs when empty.
fn render_range(
    expr: &Expr,
    body: &[Node],
    els: &[Node],
    location: &Location,
    root: &Value,
    dot: &Value,
    out: &mut String,
) -> Result<()> {
    match eval(expr, root, dot, location)? {
        Value::Array(items) => {
            if items.is_empty() {
                return render_nodes(els, root, dot, out);
            }
            for item in &items {
                render_nodes(body, root, item, out)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            if map.is_empty() {
                return render_nodes(els, root, dot, out);
            }
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                render_nodes(body, root, &map[key.as_str()], out)?;
            }
            Ok(())
        }
        v => Err(exec_err(
            format!("range can't iterate over {}", value::type_name(&v)),
            location,
        )),
    }
}

fn eval(expr: &Expr, root: &Value, dot: &Value, location: &Location) -> Result<Value> {
    match expr {
        Expr::Dot => Ok(dot.clone()),
        Expr::Root => Ok(root.clone()),
        Expr::Field { from_root, path } => {
            eval_field(*from_root, path, root, dot, location).map(Clone::clone)
        }
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Int(i) => Ok(Value::from(*i)),
        Expr::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| exec_err(format!("bad number literal {}", f), location)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Call { name, args } => {
            let func = funcs::lookup(name).ok_or_else(|| {
                exec_err(format!("function \"{}\" not defined", name), location)
            })?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, root, dot, location)?);
            }
            func(&values).map_err(|message| exec_err(message, location))
        }
    }
}

fn eval_field<'a>(
    from_root: bool,
    path: &[String],
    root: &'a Value,
    dot: &'a Value,
    location: &Location,
) -> Result<&'a Value> {
    let mut current = if from_root { root } else { dot };
    for seg in path {
        match current {
            Value::Object(map) => {
                current = map.get(seg).ok_or_else(|| {
                    exec_err(format!("undefined field '{}'", seg), location)
                })?;
            }
            v => {
                return Err(exec_err(
                    format!("can't access field '{}' in {}", seg, value::type_name(v)),
                    location,
                ))
            }
        }
    }
    Ok(current)
}

fn exec_err(message: String, location: &Location) -> GoatError {
    GoatError::TemplateExec {
        message,
        location: location.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Template;
    use serde_json::json;

    fn render_src(src: &str, data: Value) -> Result<String> {
        Template::parse(src)?.render(&data)
    }

    #[test]
    fn test_dot_against_scalar() {
        let result = render_src("Hello {{.}}", json!("world")).unwrap();
        assert_eq!(result, "Hello world");
    }

    #[test]
    fn test_field_chain() {
        let data = json!({"user": {"name": "Ada"}});
        assert_eq!(render_src("{{.user.name}}", data).unwrap(), "Ada");
    }

    #[test]
    fn test_slice_stringification() {
        let result = render_src("{{slice 1 2 3}}", json!(null)).unwrap();
        assert_eq!(result, "[1 2 3]");
    }

    #[test]
    fn test_nil_context_prints_no_value() {
        assert_eq!(render_src("{{.}}", json!(null)).unwrap(), "<no value>");
    }

    #[test]
    fn test_undefined_field_fails() {
        let result = render_src("{{.name}}", json!({}));
        match result {
            Err(GoatError::TemplateExec { message, .. }) => {
                assert!(message.contains("name"));
            }
            other => panic!("expected exec error, got {:?}", other),
        }
    }

    #[test]
    fn test_field_access_on_scalar_fails() {
        assert!(render_src("{{.a}}", json!("text")).is_err());
    }

    #[test]
    fn test_if_truthiness() {
        let src = "{{if .items}}some{{else}}none{{end}}";
        assert_eq!(render_src(src, json!({"items": [1]})).unwrap(), "some");
        assert_eq!(render_src(src, json!({"items": []})).unwrap(), "none");
    }

    #[test]
    fn test_else_if_chain() {
        let src = "{{if .a}}a{{else if .b}}b{{else}}c{{end}}";
        assert_eq!(render_src(src, json!({"a": 0, "b": 1})).unwrap(), "b");
        assert_eq!(render_src(src, json!({"a": 0, "b": 0})).unwrap(), "c");
    }

    #[test]
    fn test_range_array_rebinds_dot() {
        let src = "{{range .}}<{{.}}>{{end}}";
        assert_eq!(render_src(src, json!(["a", "b"])).unwrap(), "<a><b>");
    }

    #[test]
    fn test_range_object_sorted_values() {
        let src = "{{range .}}{{.}};{{end}}";
        assert_eq!(render_src(src, json!({"b": 2, "a": 1})).unwrap(), "1;2;");
    }

    #[test]
    fn test_range_else_on_empty() {
        let src = "{{range .}}x{{else}}empty{{end}}";
        assert_eq!(render_src(src, json!([])).unwrap(), "empty");
    }

    #[test]
    fn test_range_over_scalar_fails() {
        assert!(render_src("{{range .}}x{{end}}", json!(5)).is_err());
    }

    #[test]
    fn test_root_reaches_out_of_range() {
        let src = "{{range .items}}{{$.prefix}}{{.}} {{end}}";
        let data = json!({"prefix": "#", "items": [1, 2]});
        assert_eq!(render_src(src, data).unwrap(), "#1 #2 ");
    }

    #[test]
    fn test_nested_call_in_condition() {
        let src = "{{if not (eq .n 1)}}other{{else}}one{{end}}";
        assert_eq!(render_src(src, json!({"n": 1})).unwrap(), "one");
        assert_eq!(render_src(src, json!({"n": 2})).unwrap(), "other");
    }

    #[test]
    fn test_string_literal_with_escape() {
        let src = r#"{{"a\tb"}}"#;
        assert_eq!(render_src(src, json!(null)).unwrap(), "a\tb");
    }

    #[test]
    fn test_function_arity_error_at_render_time() {
        // Arity is a property of execution, so parsing succeeds
        let tmpl = Template::parse("{{len}}").unwrap();
        assert!(tmpl.render(&json!(null)).is_err());
    }
}
