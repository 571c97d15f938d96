//! Interactive prompting
//!
//! Reads from any `BufRead` so sessions can be driven by a cursor in tests.
//! EOF and interrupted reads behave like an empty answer.

use std::io::{BufRead, Write};

use crate::formats::{ExportFormat, FormatSelection};

pub struct Prompter<R> {
    reader: R,
}

impl<R: BufRead> Prompter<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Prints the prompt on stdout and reads one trimmed line.
    pub fn ask(&mut self, prompt: &str) -> String {
        print!("{}", prompt);
        std::io::stdout().flush().ok();

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => String::new(),
            Ok(_) => line.trim().to_string(),
        }
    }

    /// Shows the format menu and parses the answer. An empty answer falls
    /// back to `default_tokens` (from settings) before the MP4 default.
    pub fn choose_formats(&mut self, default_tokens: &str) -> FormatSelection {
        println!("\nExport formats:");
        for format in ExportFormat::ALL {
            println!("  {}) {}", format.menu_key(), format.label());
        }

        let raw = self.ask("→ Choose format(s) by number (e.g. 1 4). Enter = default MP4: ");
        let tokens = if raw.is_empty() { default_tokens } else { raw.as_str() };

        let selection = FormatSelection::parse(tokens);
        for token in &selection.ignored {
            println!("(ignoring unknown choice: {})", token);
        }

        selection
    }
}
