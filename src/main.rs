//! Command goat generates Rust source from a given template.
//!
//! The pipeline is linear: load data, read the template, parse, render,
//! optionally attach the generated-file header, optionally run rustfmt, and
//! write the result. The first failing stage aborts the run with exit code 2
//! and nothing is written.

mod cli;
mod data;
mod error;
mod format;
mod header;
mod template;

use std::io::Read;

use clap::Parser;

use cli::Cli;
use error::{GoatError, Result, EXIT_FAILURE};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Data first, so option conflicts abort before anything is parsed.
    let data = data::load(&cli)?;

    // Read template source.
    let source = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| GoatError::InputRead { source: e })?,
        None => {
            eprintln!("Reading from stdin...");
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| GoatError::InputRead { source: e })?;
            buf
        }
    };

    // Parse and render.
    let tmpl = template::Template::parse(&source)?;
    let data = data.unwrap_or(serde_json::Value::Null);
    let mut output = tmpl.render(&data)?;

    // Attach header.
    if !cli.no_header {
        output = header::attach(&output, cli.input.as_deref());
    }

    // Run rustfmt.
    if !cli.no_format {
        output = format::format_source(&output)?;
    }

    // Write output.
    match &cli.output {
        Some(path) => {
            std::fs::write(path, &output).map_err(|e| GoatError::OutputWrite {
                path: path.display().to_string(),
                source: e,
            })?;
            eprintln!("Wrote to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}
