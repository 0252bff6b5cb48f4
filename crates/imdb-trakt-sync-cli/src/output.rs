use clap::ValueEnum;
use comfy_table::{presets, Cell, Table};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// Writes command results to stdout; logs go to stderr separately
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "✓".green(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "success",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "⚠".yellow(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "warning",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet || !self.is_human() {
            return;
        }
        println!("{}", msg.as_ref());
    }

    /// Prints `table` in human mode and `data` as JSON otherwise
    pub fn render<T: Serialize + ?Sized>(&self, data: &T, table: impl FnOnce() -> Table) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Human => println!("{}", table()),
            OutputFormat::Json | OutputFormat::JsonPretty => {
                let value = serde_json::to_value(data).unwrap_or_else(|e| {
                    json!({
                        "type": "error",
                        "message": format!("Failed to serialize output: {}", e)
                    })
                });
                self.print_json(&value);
            }
        }
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Json | OutputFormat::Human => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
        }
    }
}

/// Table with the shared look and a bold header row
pub fn new_table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        header
            .into_iter()
            .map(|h| Cell::new(h.into()).add_attribute(comfy_table::Attribute::Bold)),
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_header() {
        let mut table = new_table(["Stage", "Added"]);
        table.add_row(vec!["watchlist-movie", "3"]);
        let rendered = table.to_string();
        assert!(rendered.contains("Stage"));
        assert!(rendered.contains("watchlist-movie"));
    }
}
