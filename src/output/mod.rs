//
//  apigee-cli
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Renders command results either for people (tables and status lines) or
//! for pipelines (pretty-printed JSON on stdout).
//!
//! - [`OutputFormat`]: the two output formats
//! - [`OutputWriter`]: entry point for writing results and status messages
//! - [`TableOutput`]: implemented by every result a command prints
//! - [`table`]: `comfy_table` helpers
//!
//! Status messages go to stderr in JSON mode so stdout stays parseable.

mod table;

pub use table::*;

use serde::Serialize;

/// The available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    /// Human-readable tables with optional color.
    #[default]
    Table,
    /// Pretty-printed JSON for scripting.
    Json,
}

/// Writes results and status messages in the selected format.
///
/// # Example
///
/// ```rust,ignore
/// use apigee_cli::output::{OutputFormat, OutputWriter};
///
/// let writer = OutputWriter::new(OutputFormat::Json);
/// writer.write(&imported)?;
/// writer.write_success("Imported weatherapi revision 3");
/// ```
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    /// Creates a writer; color follows the terminal's capabilities.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    /// Creates a writer from the global `--json` flag.
    pub fn from_json_flag(json: bool) -> Self {
        Self::new(if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        })
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Writes a single value.
    pub fn write<T: Serialize + TableOutput>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(value)?;
                println!("{}", json);
            }
            OutputFormat::Table => value.print_table(self.color),
        }
        Ok(())
    }

    /// Writes a warning message to stderr.
    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    /// Writes a success message; to stderr in JSON mode.
    pub fn write_success(&self, msg: &str) {
        use console::style;
        let line = if self.color {
            format!("{} {}", style("✓").green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        };
        if self.is_json() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Types that can be printed as a table or field list.
pub trait TableOutput {
    /// Prints the value for a terminal.
    fn print_table(&self, color: bool);
}

/// Prints a bold section header with an underline.
pub fn print_header(text: &str) {
    use console::style;
    println!("{}", style(text).bold());
    println!("{}", "-".repeat(text.len()));
}

/// Prints a `key: value` line, dimming the key when color is enabled.
pub fn print_field(key: &str, value: &str, color: bool) {
    use console::style;
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}
