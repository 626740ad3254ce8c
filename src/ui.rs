//! ANSI-styled output helpers for the CLI layer.
//!
//! Values the commands compute go to stdout unstyled; these helpers carry
//! the progress and error text around them.

/// Format and print an error message in red to stderr.
pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message);
}

/// Report a tag that was excluded from version resolution.
///
/// Goes to stderr so the value printed on stdout stays parseable.
pub fn display_skip_notice(tag: &str, reason: &str) {
    eprintln!("skipping tag '{}': {}", tag, reason);
}
