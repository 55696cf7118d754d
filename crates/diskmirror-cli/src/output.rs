//! Terminal output for the CLI
//!
//! Human mode prints status lines and one line per mirroring action.
//! JSON mode prints a single document per command (see
//! [`OutputFormatter::print_json`]) plus error objects on stderr.

use diskmirror_core::domain::Action;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// Where the commands send what they have to say
pub trait OutputFormatter {
    /// Headline of a command that did its job
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    /// Indented detail under a headline; dropped in JSON mode
    fn info(&self, message: &str);
    /// A planned action, or a failed one when `failure` carries the reason
    fn action(&self, action: &Action, failure: Option<&str>);
    /// The command's machine-readable result; dropped in human mode
    fn print_json(&self, value: &serde_json::Value);
}

pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {message}");
    }

    fn info(&self, message: &str) {
        println!("  {message}");
    }

    fn action(&self, action: &Action, failure: Option<&str>) {
        println!("  {}", action_line(action, failure));
    }

    fn print_json(&self, _value: &serde_json::Value) {}
}

pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!("{}", serde_json::json!({"success": true, "message": message}));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", serde_json::json!({"success": false, "error": message}));
    }

    fn info(&self, _message: &str) {}

    // Actions are part of the command's JSON document.
    fn action(&self, _action: &Action, _failure: Option<&str>) {}

    fn print_json(&self, value: &serde_json::Value) {
        println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

/// Renders an action as `<marker> <kind> <name>`, with the failure reason
/// appended after a colon
///
/// Markers: `+` upload, `~` overwrite, `-` delete.
pub fn action_line(action: &Action, failure: Option<&str>) -> String {
    let marker = match action {
        Action::Upload(_) => '+',
        Action::Overwrite(_) => '~',
        Action::Delete(_) => '-',
    };
    let line = format!("{marker} {:<9} {}", action.kind().as_str(), action.name());
    match failure {
        Some(reason) => format!("{line}: {reason}"),
        None => line,
    }
}

/// "1 file" / "3 files"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
