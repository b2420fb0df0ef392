//! Template parsing and rendering.
//!
//! Templates mix literal text with `{{ ... }}` actions: field references
//! resolved against JSON data, calls into a fixed function registry, and
//! `if`/`range` blocks. Parsing and rendering are separate passes so syntax
//! errors surface before any output is produced.

mod exec;
mod funcs;
mod lexer;
mod parser;
mod value;

use crate::error::Result;
use serde_json::Value;

/// A parsed template, ready to be rendered.
pub struct Template {
    nodes: Vec<parser::Node>,
}

impl Template {
    /// Parse template source. Syntax errors and references to functions
    /// missing from the registry are rejected here, before rendering.
    pub fn parse(source: &str) -> Result<Template> {
        let tokens = lexer::lex(source)?;
        let nodes = parser::parse(tokens)?;
        Ok(Template { nodes })
    }

    /// Render the template against the given data.
    pub fn render(&self, data: &Value) -> Result<String> {
        exec::render(&self.nodes, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_then_render() {
        let tmpl = Template::parse("Hello, {{.name}}!").unwrap();
        let result = tmpl.render(&json!({"name": "World"})).unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_render_twice_is_deterministic() {
        let tmpl = Template::parse("{{range .}}{{.}},{{end}}").unwrap();
        let data = json!([1, 2, 3]);
        let first = tmpl.render(&data).unwrap();
        let second = tmpl.render(&data).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "1,2,3,");
    }

    #[test]
    fn test_parse_error_reported_before_rendering() {
        assert!(Template::parse("{{if .x}}no end").is_err());
    }
}
