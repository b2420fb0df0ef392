use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{GoatError, Result};

/// Run rustfmt over the rendered source and return the canonical form.
///
/// All-or-nothing: any formatter failure (unparsable source, missing
/// rustfmt binary) aborts the run, and the unformatted text is never
/// written as a fallback.
pub fn format_source(src: &str) -> Result<String> {
    let mut child = Command::new("rustfmt")
        .args(["--edition", "2021", "--emit", "stdout"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format_err(anyhow::Error::new(e).context("could not run rustfmt")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| format_err(anyhow::anyhow!("could not open rustfmt stdin")))?;
    stdin
        .write_all(src.as_bytes())
        .map_err(|e| format_err(anyhow::Error::new(e).context("could not pipe source to rustfmt")))?;
    drop(stdin);

    let output = child
        .wait_with_output()
        .map_err(|e| format_err(anyhow::Error::new(e).context("rustfmt did not finish")))?;

    if !output.status.success() {
        let detail = String::from_utf8_lossy(&output.stderr);
        return Err(format_err(anyhow::anyhow!(
            "rustfmt {}: {}",
            output.status,
            detail.trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|_| format_err(anyhow::anyhow!("rustfmt produced invalid UTF-8")))
}

fn format_err(source: anyhow::Error) -> GoatError {
    GoatError::Format { source }
}
