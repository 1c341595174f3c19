//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::{ColoredString, Colorize};

use crate::domain::LevelCategory;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print key/value line (green label)
pub fn field(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{:>14}: {}", label.green(), msg);
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Paint text in the color of a level category.
///
/// Neutral nodes keep the terminal default.
pub fn paint_level(text: &str, category: LevelCategory) -> ColoredString {
    match category {
        LevelCategory::A => text.blue().bold(),
        LevelCategory::B => text.green(),
        LevelCategory::C => text.yellow(),
        LevelCategory::D => text.magenta(),
        LevelCategory::E => text.cyan(),
        LevelCategory::F => text.bright_blue(),
        LevelCategory::G => text.bright_green(),
        LevelCategory::H => text.bright_yellow(),
        LevelCategory::Overflow => text.bright_black(),
        LevelCategory::Neutral => text.normal(),
    }
}
