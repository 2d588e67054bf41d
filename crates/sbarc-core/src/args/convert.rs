//! Converter (`pandoc` Markdown → ePub) argument mapping.

use super::validation::{Checks, ValidationError};
use crate::command::Command;
use crate::config::{ConvertConfig, DEFAULT_AUTHOR, DEFAULT_TITLE};
use crate::ports::Tool;

const TARGET_EXTENSION: &str = "epub";
const DEFAULT_SPLIT_LEVEL: u32 = 1;

pub fn build_convert(config: &ConvertConfig) -> Result<Command, Vec<ValidationError>> {
    let mut checks = Checks::default();

    if let Some(dir) = checks.required("source folder", &config.source_dir) {
        checks.path("source folder", dir);
    }
    if config.inputs.is_empty() {
        checks.push(ValidationError::Missing {
            field: "input files",
        });
    }

    let output = checks.required("output file", &config.output);
    if let Some(output) = output
        && checks.path("output file", output)
    {
        checks.extension("output file", output, TARGET_EXTENSION);
    }

    let split = checks.positive("split level", config.split_level.as_deref());

    let errors = checks.into_errors();
    let Some(output) = output else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    let title = non_blank_or(&config.title, DEFAULT_TITLE);
    let author = non_blank_or(&config.author, DEFAULT_AUTHOR);

    let mut cmd = Command::new(Tool::Converter.canonical_name());
    for input in &config.inputs {
        cmd.arg(input.to_string_lossy());
    }
    cmd.flag_value("-o", output)
        .flag_value("--metadata", format!("title={title}"))
        .flag_value("--metadata", format!("author={author}"));
    if config.table_of_contents {
        cmd.arg("--toc");
    }
    cmd.arg(format!(
        "--split-level={}",
        split.unwrap_or(DEFAULT_SPLIT_LEVEL)
    ));

    Ok(cmd)
}

fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}
