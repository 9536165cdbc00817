//! Output formatting for CLI commands.

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

/// Print data in the specified format.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No parcels found.".dimmed());
            } else {
                let table = Table::new(data).to_string();
                println!("{}", table);
            }
        }
        OutputFormat::Json => println!("{}", format_json(data, "[]")),
    }
}

/// Print a single item as a two-column table, or as JSON.
pub fn print_single<T: Serialize + Tabled>(data: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<FieldRow> = T::headers()
                .into_iter()
                .zip(data.fields())
                .map(|(field, value)| FieldRow {
                    field: field.into_owned(),
                    value: value.into_owned(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
        OutputFormat::Json => println!("{}", format_json(data, "{}")),
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}

fn format_json<T: Serialize + ?Sized>(data: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        id: String,
        count: i32,
    }

    #[test]
    fn test_format_json_pretty() {
        let rows = vec![Row {
            id: "oJZWV".to_string(),
            count: 2,
        }];
        let json = format_json(&rows, "[]");
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["id"], "oJZWV");
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(
            OutputFormat::from_str("json", true).unwrap(),
            OutputFormat::Json
        );
        assert!(OutputFormat::from_str("yaml", true).is_err());
    }
}
