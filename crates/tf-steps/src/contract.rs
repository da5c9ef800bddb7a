//! The command-line contract every bundled step follows:
//! `<step> [input] [output] [extra...]`.
//!
//! With no input path the step reads stdin; with no output path it writes
//! stdout. A missing input file is treated as empty input so the step still
//! produces an output file.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

/// Positional arguments shared by all steps.
#[derive(Debug, Parser)]
pub struct StepArgs {
    /// Input file (stdin when omitted)
    pub input: Option<PathBuf>,

    /// Output file (stdout when omitted)
    pub output: Option<PathBuf>,

    /// Step-specific trailing arguments
    #[arg(allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

impl StepArgs {
    /// Read the input payload.
    pub fn read_input(&self) -> Result<String> {
        let bytes = match &self.input {
            Some(path) => match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Error reading input file {}", path.display())
                    })
                }
            },
            None => {
                let mut buf = Vec::new();
                io::stdin()
                    .read_to_end(&mut buf)
                    .context("Error reading stdin")?;
                buf
            }
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write the output payload.
    pub fn write_output(&self, payload: &str) -> Result<()> {
        match &self.output {
            Some(path) => std::fs::write(path, payload)
                .with_context(|| format!("Error writing output file {}", path.display())),
            None => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{payload}").context("Error writing stdout")
            }
        }
    }
}

/// Parse arguments, apply `transform` to the input, and write the result.
///
/// `transform` receives the input text and the trailing arguments. Any I/O
/// failure is printed to stderr and turns into a non-zero exit code.
pub fn run<F>(transform: F) -> ExitCode
where
    F: FnOnce(&str, &[String]) -> String,
{
    let args = StepArgs::parse();
    match execute(&args, transform) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute<F>(args: &StepArgs, transform: F) -> Result<()>
where
    F: FnOnce(&str, &[String]) -> String,
{
    let input = args.read_input()?;
    let output = transform(&input, &args.extra);
    args.write_output(&output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: Option<PathBuf>, output: Option<PathBuf>) -> StepArgs {
        StepArgs {
            input,
            output,
            extra: Vec::new(),
        }
    }

    #[test]
    fn missing_input_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(Some(dir.path().join("absent.txt")), None);
        assert_eq!(a.read_input().unwrap(), "");
    }

    #[test]
    fn transform_output_lands_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "abc").unwrap();

        let a = args(Some(input), Some(output.clone()));
        execute(&a, |text, _| text.to_uppercase()).unwrap();
        assert_eq!(std::fs::read_to_string(output).unwrap(), "ABC");
    }

    #[test]
    fn unwritable_output_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(None, Some(dir.path().join("missing/dir/out.txt")));
        let err = a.write_output("x").unwrap_err();
        assert!(format!("{err:#}").contains("Error writing output file"));
    }

    #[test]
    fn parses_positional_contract() {
        let a = StepArgs::try_parse_from(["step", "in.txt", "out.txt", "2"]).unwrap();
        assert_eq!(a.input, Some(PathBuf::from("in.txt")));
        assert_eq!(a.output, Some(PathBuf::from("out.txt")));
        assert_eq!(a.extra, ["2"]);

        let bare = StepArgs::try_parse_from(["step"]).unwrap();
        assert!(bare.input.is_none() && bare.output.is_none());
    }
}
