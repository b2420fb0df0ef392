use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "goat",
    version,
    about = "Generates Rust source from a text template",
    long_about = "Renders a text template against optional JSON data, prepends a \
                  generated-file header, runs rustfmt over the result, and writes it \
                  to a file or stdout."
)]
pub struct Cli {
    /// Input template file. If omitted, reads from stdin.
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output file. If omitted, writes to stdout.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Don't add a header to the output.
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Don't run rustfmt on the result.
    #[arg(long = "no-format")]
    pub no_format: bool,

    /// JSON-encoded data for the template.
    #[arg(short = 'd', long = "data", value_name = "JSON")]
    pub data: Option<String>,

    /// File with JSON-encoded data for the template.
    #[arg(long = "data-file", value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["goat"]).unwrap();
        assert!(cli.input.is_none());
        assert!(cli.output.is_none());
        assert!(!cli.no_header);
        assert!(!cli.no_format);
        assert!(cli.data.is_none());
        assert!(cli.data_file.is_none());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "goat",
            "-i",
            "in.tmpl",
            "-o",
            "out.rs",
            "--no-header",
            "--no-format",
            "-d",
            "{}",
        ])
        .unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("in.tmpl")));
        assert_eq!(cli.output, Some(PathBuf::from("out.rs")));
        assert!(cli.no_header);
        assert!(cli.no_format);
        assert_eq!(cli.data.as_deref(), Some("{}"));
    }

    #[test]
    fn test_data_file_flag() {
        let cli = Cli::try_parse_from(["goat", "--data-file", "d.json"]).unwrap();
        assert_eq!(cli.data_file, Some(PathBuf::from("d.json")));
    }
}
