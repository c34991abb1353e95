use terminal_size::{terminal_size, Width};

use crate::constant::DEFAULT_WIDTH;
use crate::parser::interface::UserInterface;

/// One option's row in the help listing.
#[derive(Debug)]
pub(crate) struct HelpEntry {
    pub(crate) label: String,
    pub(crate) required: bool,
    pub(crate) conflicts: Vec<String>,
    pub(crate) requires: Vec<String>,
}

/// Renders the help listing and the usage summary through a [`UserInterface`].
pub(crate) struct Printer {
    about: Option<String>,
    entries: Vec<HelpEntry>,
    width: usize,
}

impl Printer {
    pub(crate) fn terminal(about: Option<String>, entries: Vec<HelpEntry>) -> Self {
        let width = match terminal_size() {
            Some((Width(width), _)) => width as usize,
            None => DEFAULT_WIDTH,
        };

        Self::new(about, entries, width)
    }

    pub(crate) fn new(about: Option<String>, entries: Vec<HelpEntry>, width: usize) -> Self {
        Self {
            about,
            entries,
            width,
        }
    }

    pub(crate) fn print_help(&self, user_interface: &dyn UserInterface) {
        if let Some(about) = &self.about {
            user_interface.print(about.clone());
        }

        user_interface.print("Arguments: (! denotes required argument)".to_string());

        let column = self
            .entries
            .iter()
            .map(|entry| entry.label.len())
            .max()
            .unwrap_or(0);

        for entry in &self.entries {
            let marker = if entry.required { '!' } else { ' ' };
            let mut annotations = Vec::default();

            if !entry.conflicts.is_empty() {
                annotations.push(format!("(conflicts with {})", entry.conflicts.join(", ")));
            }

            if !entry.requires.is_empty() {
                annotations.push(format!("(requires {})", entry.requires.join(", ")));
            }

            let line = format!("{marker}  {label:column$}", label = entry.label);

            if annotations.is_empty() {
                user_interface.print(line.trim_end().to_string());
            } else {
                let annotations = annotations.join(" ");

                if line.len() + 1 + annotations.len() <= self.width {
                    user_interface.print(format!("{line} {annotations}"));
                } else {
                    // Not enough room; push the annotations onto their own line.
                    user_interface.print(line.trim_end().to_string());
                    user_interface.print(format!("{:column$}  {annotations}", ""));
                }
            }
        }
    }

    pub(crate) fn print_usage(&self, program: &str, user_interface: &dyn UserInterface) {
        user_interface.print_error(format!("usage: {program}"));

        let labels: Vec<String> = self
            .entries
            .iter()
            .map(|entry| format!("[{}]", entry.label))
            .collect();
        user_interface.print_error(labels.join(" "));
    }
}
