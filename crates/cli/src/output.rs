//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use predictor_lib::predictor::{BannerStyle, ResultView};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print the verdict banner, progress bar and confidence line
pub fn print_verdict(view: &ResultView) {
    let headline = match view.style {
        BannerStyle::Success => view.headline.green().bold(),
        BannerStyle::Error => view.headline.red().bold(),
    };
    println!("{}", headline);
    println!("{} {}%", progress_bar(view.progress_percent, 30), view.progress_percent);
    println!("{}", view.confidence_text);
}

/// Text progress bar for a 0..=100 percentage
pub fn progress_bar(percent: u8, width: usize) -> String {
    let percent = percent.min(100) as usize;
    let filled = (percent * width + 50) / 100;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Color an artifact state
pub fn color_state(state: &str) -> String {
    match state.to_lowercase().as_str() {
        "loaded" => state.green().to_string(),
        "unloaded" => state.yellow().to_string(),
        "load_failed" => state.red().to_string(),
        _ => state.to_string(),
    }
}

/// Trim a bound or default to the precision a field is entered with
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
