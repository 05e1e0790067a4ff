use owo_colors::OwoColorize;
use pagebind_core::{Book, Metadata, Observer, Stage, Warning};
use url::Url;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Pagebind".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Turn a web page into an EPUB\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print the metadata block shown before packaging
pub fn print_metadata(metadata: &Metadata) {
    eprintln!("  {} {}", "Title:".dimmed(), metadata.title.bright_white());
    eprintln!("  {} {}", "Author:".dimmed(), metadata.author.bright_white());
    if metadata.has_date() {
        eprintln!("  {} {}", "Date:".dimmed(), metadata.date.bright_white());
    }
}

/// Print a summary of the finished book
pub fn print_book_summary(book: &Book) {
    eprintln!("{}", "═".repeat(60).dimmed());
    print_metadata(&book.metadata);
    eprintln!("  {} {}", "Images:".dimmed(), book.resources().len().to_string().bright_white());
    let cover = if book.cover().is_some() { "yes" } else { "no" };
    eprintln!("  {} {}", "Cover:".dimmed(), cover.bright_white());
    eprintln!("  {} {}", "Payload:".dimmed(), format_size(book.payload_size()).bright_white());
    eprintln!("{}", "═".repeat(60).dimmed());
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Renders conversion progress on stderr.
///
/// Warnings are always shown. Steps and per-image lines only in verbose mode.
pub struct ConsoleObserver {
    pub verbose: bool,
}

impl Observer for ConsoleObserver {
    fn stage(&self, stage: Stage) {
        if self.verbose {
            print_step(stage.number(), Stage::COUNT, &stage.to_string());
        }
    }

    fn image_embedded(&self, index: usize, url: &Url, local_path: &str, bytes: usize) {
        if self.verbose {
            eprintln!(
                "  {} {} {} {}",
                format!("#{}", index).dimmed(),
                url.as_str().bright_white(),
                "→".dimmed(),
                format!("{} ({})", local_path, format_size(bytes)).dimmed()
            );
        }
    }

    fn warning(&self, warning: &Warning) {
        print_warning(&warning.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
    }
}
