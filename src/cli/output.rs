use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Print a dimmed detail line under the previous message.
pub fn detail(msg: &str) {
    println!("    {}", msg.dimmed());
}

/// Start a spinner on stderr for a network call. Hidden when stderr is
/// not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_message(msg.to_string());
    bar
}

/// Clear a spinner before printing the outcome.
pub fn finish_spinner(bar: ProgressBar) {
    bar.finish_and_clear();
}

/// Shorten an id to its first 8 characters for tables.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}
