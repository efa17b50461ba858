//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::{NavigationFlags, PathEntry, Topic};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print indented hint (dimmed)
pub fn hint(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg.to_string().dimmed());
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print prompt without newline (cyan)
pub fn prompt(msg: &(impl std::fmt::Display + ?Sized)) {
    use std::io::Write;
    print!("{} ", msg.to_string().cyan());
    std::io::stdout().flush().ok();
}

/// Render a path as `Movies > Sci-Fi > Dune`.
pub fn breadcrumb(path: &[PathEntry]) -> String {
    path.iter()
        .map(|entry| entry.prompt.as_str())
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Gesture hints available for the current topic.
pub fn gesture_hints(flags: &NavigationFlags, generating: bool) -> Vec<String> {
    let mut hints = vec!["l: next sibling".to_string()];
    if flags.can_descend {
        hints.push("r: subtopics".to_string());
    } else if generating {
        hints.push("r: (generating...)".to_string());
    } else {
        hints.push("r: generate subtopics".to_string());
    }
    if flags.can_ascend {
        hints.push("u: back".to_string());
    }
    hints.push("d: article".to_string());
    hints
}

/// Print the topic card: prompt, id, path and available gestures.
pub fn card(topic: &Topic, path: &[PathEntry], flags: &NavigationFlags, generating: bool) {
    println!();
    header(&topic.prompt);
    detail(&format!("id: {}", topic.id));
    if path.len() > 1 {
        detail(&breadcrumb(path));
    }
    hint(&gesture_hints(flags, generating).join("  "));
}
