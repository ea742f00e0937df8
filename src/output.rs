//! Shared output formatting for taskstash CLI commands.

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};

pub const SCHEMA_VERSION: &str = "taskstash.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    data: &'a T,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    error: ErrorBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

fn print_json<T: Serialize>(payload: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

/// Print a command result: a JSON envelope with `--json`, nothing with
/// `--quiet`, otherwise the human rendering.
pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        return print_json(&SuccessEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings: human.map(|h| h.warnings.as_slice()).unwrap_or_default(),
        });
    }

    match human {
        Some(human) if !options.quiet => println!("{}", format_human(human)),
        _ => {}
    }
    Ok(())
}

/// Report a failed command. JSON goes to stdout, text to stderr.
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if json {
        return print_json(&ErrorEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
            hint,
        });
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    command_name_from(std::env::args().skip(1))
}

fn command_name_from(args: impl IntoIterator<Item = String>) -> String {
    let mut words = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--data-dir" {
            args.next();
            continue;
        }
        if !arg.starts_with('-') {
            words.push(arg);
        }
    }

    let mut words = words.into_iter();
    let Some(command) = words.next() else {
        return "taskstash".to_string();
    };

    if matches!(command.as_str(), "completed" | "category") {
        if let Some(sub) = words.next() {
            return format!("{command} {sub}");
        }
    }
    command
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        _ => "operation_failed",
    }
}

fn error_hint(err: &Error) -> Option<String> {
    match err {
        Error::TaskNotFound(_) => Some("taskstash list".to_string()),
        Error::AmbiguousTaskId { .. } => Some("use more characters of the id".to_string()),
        Error::Category(_) => Some("taskstash category list".to_string()),
        Error::InvalidConfig(_) => Some("fix taskstash.toml then retry".to_string()),
        Error::LockFailed(_) => Some("another taskstash process is busy; retry".to_string()),
        _ => None,
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_output_sections() {
        let mut output = HumanOutput::new("Task created");
        output.push_summary("ID", "01ABC");
        output.push_summary("Overdue", "");
        output.push_detail("Buy milk");
        output.push_warning("careful");

        let text = format_human(&output);
        assert_eq!(
            text,
            concat!(
                "Task created\n\nSummary:\n- ID: 01ABC\n- Overdue\n\n",
                "Details:\n- Buy milk\n\nWarnings:\n- careful"
            )
        );
    }

    #[test]
    fn command_name_skips_global_options() {
        let args = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            command_name_from(args(&["--data-dir", "/tmp/x", "--json", "rm", "01A"])),
            "rm"
        );
        assert_eq!(
            command_name_from(args(&["-q", "category", "add", "Work"])),
            "category add"
        );
        assert_eq!(command_name_from(args(&["--json"])), "taskstash");
    }

    #[test]
    fn header_only_when_empty() {
        assert_eq!(format_human(&HumanOutput::new("No tasks")), "No tasks");
    }
}
