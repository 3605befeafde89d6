//! Terminal output utilities

use console::style;

/// Print an error message to stderr
pub fn print_error(message: &str) {
    eprintln!("{}: {}", style("error").red().bold(), message);
}

/// Print a warning message to stderr
pub fn print_warning(message: &str) {
    eprintln!("{}: {}", style("warning").yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{}: {}", style("info").blue().bold(), message);
}

/// Print a labelled step, e.g. `Building reagent-linux-armv7...`
pub fn print_step(label: &str, message: &str) {
    println!("{} {}", style(label).cyan().bold(), message);
}

/// Print an indented hint block to stderr
pub fn print_hint(hint: &str) {
    for line in hint.lines() {
        eprintln!("  {}", style(line).dim());
    }
}
