use serde_json::Value;
use std::fs;

use crate::cli::Cli;
use crate::error::{GoatError, Result};

/// Resolve the value exposed to the template from the command line options.
///
/// Returns `None` when no data was supplied at all; the template then
/// renders against null. Option conflicts are caught here, before any file
/// is read or any template parsed.
pub fn load(cli: &Cli) -> Result<Option<Value>> {
    if cli.data.is_some() && cli.data_file.is_some() {
        return Err(GoatError::DataConflict);
    }

    if let Some(raw) = &cli.data {
        let value =
            serde_json::from_str(raw).map_err(|e| GoatError::DataParse { source: e })?;
        return Ok(Some(value));
    }

    if let Some(path) = &cli.data_file {
        let content = fs::read_to_string(path).map_err(|e| GoatError::DataFileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let value =
            serde_json::from_str(&content).map_err(|e| GoatError::DataFileParse {
                path: path.display().to_string(),
                source: e,
            })?;
        return Ok(Some(value));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn cli(data: Option<&str>, data_file: Option<PathBuf>) -> Cli {
        Cli {
            input: None,
            output: None,
            no_header: false,
            no_format: false,
            data: data.map(String::from),
            data_file,
        }
    }

    #[test]
    fn test_no_data() {
        assert_eq!(load(&cli(None, None)).unwrap(), None);
    }

    #[test]
    fn test_inline_data() {
        let result = load(&cli(Some(r#"{"name": "x"}"#), None)).unwrap();
        assert_eq!(result, Some(json!({"name": "x"})));
    }

    #[test]
    fn test_inline_scalar() {
        let result = load(&cli(Some(r#""world""#), None)).unwrap();
        assert_eq!(result, Some(json!("world")));
    }

    #[test]
    fn test_malformed_inline_data() {
        let result = load(&cli(Some("{bad}"), None));
        match result {
            Err(GoatError::DataParse { .. }) => {}
            other => panic!("expected DataParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_data_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, r#"{{"n": 1}}"#).unwrap();

        let result = load(&cli(None, Some(file.path().to_path_buf()))).unwrap();
        assert_eq!(result, Some(json!({"n": 1})));
    }

    #[test]
    fn test_unreadable_data_file() {
        let result = load(&cli(None, Some(PathBuf::from("/no/such/file.json"))));
        match result {
            Err(GoatError::DataFileRead { .. }) => {}
            other => panic!("expected DataFileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_data_file() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(file, "not json").unwrap();

        let result = load(&cli(None, Some(file.path().to_path_buf())));
        match result {
            Err(GoatError::DataFileParse { .. }) => {}
            other => panic!("expected DataFileParse error, got {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_options() {
        let result = load(&cli(Some("{}"), Some(PathBuf::from("d.json"))));
        match result {
            Err(GoatError::DataConflict) => {}
            other => panic!("expected DataConflict error, got {:?}", other),
        }
    }
}
