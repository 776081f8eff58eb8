//! Terminal rendering for sync results.

use farewatch_core::{RowOutcome, RowStatus, SyncReport};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for RowOutcome {
    fn render(&self) -> String {
        let label = format!("{} {}", self.city, format!("#{}", self.id).dimmed());

        match &self.status {
            RowStatus::Skipped => format!("   {} {}", "=".dimmed(), label),
            RowStatus::Updated(code) => format!("   {} {} {}", "+".green(), label, code.green()),
            RowStatus::Unresolved(reason) => {
                format!("   {} {} {}", "?".yellow(), label, reason.to_string().yellow())
            }
            RowStatus::Failed(error) => format!("   {} {} {}", "!".red(), label, error.red()),
        }
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        if let Some(error) = &self.store_error {
            return format!("Could not read the sheet: {}", error.red());
        }

        if self.rows.is_empty() {
            return "No rows in the sheet".dimmed().to_string();
        }

        let mut lines: Vec<String> = self.rows.iter().map(|row| row.render()).collect();

        lines.push(String::new());
        lines.push(format!(
            "Updated {}, skipped {}, unresolved {}, failed {}",
            self.updated(),
            self.skipped(),
            self.unresolved(),
            self.failed()
        ));

        lines.join("\n")
    }
}
