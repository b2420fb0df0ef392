use std::fmt;

/// Exit code for every failure, matching the tool's contract
pub const EXIT_FAILURE: i32 = 2;

/// Position of a template construct, for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Calculate location from template source and byte offset
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let before = &source[..offset.min(source.len())];
        let lines: Vec<&str> = before.split('\n').collect();
        let line = lines.len();
        let column = lines.last().map(|l| l.chars().count() + 1).unwrap_or(1);

        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Main error type for goat
#[derive(Debug, thiserror::Error)]
pub enum GoatError {
    // Configuration errors
    #[error("only one of --data and --data-file can be used")]
    DataConflict,

    // Data loading errors
    #[error("failed to parse data (--data): {source}")]
    DataParse { source: serde_json::Error },

    #[error("could not read data file '{path}': {source}")]
    DataFileRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse data file '{path}': {source}")]
    DataFileParse {
        path: String,
        source: serde_json::Error,
    },

    // Template source I/O
    #[error("failed to read input: {source}")]
    InputRead { source: std::io::Error },

    // Template errors
    #[error("failed to parse template: {message} ({location})")]
    TemplateParse { message: String, location: Location },

    #[error("failed to execute template: {message} ({location})")]
    TemplateExec { message: String, location: Location },

    // Formatting
    #[error("failed to format the generated source: {source}")]
    Format { source: anyhow::Error },

    // Output
    #[error("failed to write output '{path}': {source}")]
    OutputWrite {
        path: String,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, GoatError>;
