//! Terminal styling.

use colored::Colorize;

pub(crate) struct Theme;

impl Theme {
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }

    /// Arrow and label for one protocol message.
    pub(crate) fn message(direction: Direction, message_type: &str, body: &str) -> String {
        let arrow = match direction {
            Direction::ToEngine => "host → engine".blue(),
            Direction::ToHost => "engine → host".magenta(),
        };
        format!("{arrow}  {}  {}", message_type.bold(), body.dimmed())
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Direction {
    ToEngine,
    ToHost,
}
