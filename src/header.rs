use std::path::Path;

const PROJECT_URL: &str = "https://www.github.com/fluhus/goat";

/// Prepend the generated-file comment block to rendered output.
///
/// When the template came from a named file the header says so; for stdin
/// input the "from" clause is omitted.
pub fn attach(rendered: &str, input: Option<&Path>) -> String {
    let from = match input {
        Some(path) => format!("from '{}' ", path.display()),
        None => String::new(),
    };
    format!(
        "// ***** DO NOT EDIT THIS FILE MANUALLY. *****\n\
         //\n\
         // This file was auto-generated {}using goat.\n\
         //\n\
         // goat: {}\n\
         //\n\
         {}",
        from, PROJECT_URL, rendered
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_input_file() {
        let out = attach("content\n", Some(Path::new("foo.tmpl")));
        assert!(out.starts_with("// ***** DO NOT EDIT THIS FILE MANUALLY. *****\n"));
        assert!(out.contains("auto-generated from 'foo.tmpl' using goat."));
        assert!(out.ends_with("//\ncontent\n"));
    }

    #[test]
    fn test_header_for_stdin_input() {
        let out = attach("content\n", None);
        assert!(out.contains("auto-generated using goat."));
        assert!(!out.contains("from '"));
    }
}
