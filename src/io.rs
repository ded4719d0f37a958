use std::path::Path;
use std::str::FromStr;

use crate::{compiler::ast::Program, result::Result};

/// How a declaration tree is written out, or read in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Format {
    Source,
    Json,
    Yaml,
}

impl Format {
    /// Files ending in `.json`, `.yaml` or `.yml` hold a declaration tree
    /// which has already been parsed.  Anything else is source code.
    pub fn from_path(path: &Path) -> Format {
        match path
            .extension()
            .and_then(|ex| ex.to_str())
            .map(|ex| ex.to_ascii_lowercase())
        {
            Some(ex) if ex == "json" => Format::Json,
            Some(ex) if ex == "yaml" || ex == "yml" => Format::Yaml,
            _ => Format::Source,
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "source" => Ok(Format::Source),
            "json" => Ok(Format::Json),
            "yaml" => Ok(Format::Yaml),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// The contents of an input file.
#[derive(Debug)]
pub enum Input {
    Source(String),
    Tree(Program),
}

pub fn read_input(path: &Path) -> Result<Input> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read input file {}: {}", path.display(), e))?;
    match Format::from_path(path) {
        Format::Source => Ok(Input::Source(text)),
        Format::Json => serde_json::from_str(&text)
            .map(Input::Tree)
            .map_err(|e| format!("Invalid declaration tree in {}: {}", path.display(), e)),
        Format::Yaml => serde_yaml::from_str(&text)
            .map(Input::Tree)
            .map_err(|e| format!("Invalid declaration tree in {}: {}", path.display(), e)),
    }
}

pub fn write_program(
    program: &Program,
    format: Format,
    output: &mut dyn std::io::Write,
) -> Result<()> {
    let text = match format {
        Format::Source => program.to_string(),
        Format::Json => serde_json::to_string_pretty(program).map_err(|e| e.to_string())?,
        Format::Yaml => serde_yaml::to_string(program).map_err(|e| e.to_string())?,
    };
    output
        .write_all(text.as_bytes())
        .map_err(|e| format!("Failed to write program: {}", e))
}
