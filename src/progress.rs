//! Progress reporting for hlink
//!
//! A spinner while the trees are walked, and a styled summary at the end.
//! Everything here writes to stderr except the summary, which follows the
//! per-pair report on stdout.

use crate::reconcile::ReconcileStats;
use crate::walker::CollectStats;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while collecting paths
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the spinner with walk counters
    pub fn update(&self, label: &str, stats: &CollectStats) {
        self.bar.set_message(format!(
            "{} | Dirs: {} | Files: {} | Excluded: {}",
            label,
            format_number(stats.dirs),
            format_number(stats.emitted),
            format_number(stats.excluded),
        ));
    }

    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Remove the spinner so the report starts on a clean line
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Print a summary of the reconciliation
pub fn print_summary(stats: &ReconcileStats, dry_run: bool) {
    let title = match (stats.completed, dry_run) {
        (false, _) => style("Run Interrupted").yellow().bold(),
        (true, true) => style("Dry Run Complete").green().bold(),
        (true, false) => style("Link Complete").green().bold(),
    };

    println!();
    println!("{}", title);
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Pairs:").bold(), format_number(stats.pairs));
    println!(
        "  {} {}",
        style("Already linked:").bold(),
        format_number(stats.already_linked)
    );
    if dry_run {
        println!(
            "  {} {}",
            style("Would link:").bold(),
            format_number(stats.would_link)
        );
    } else {
        println!("  {} {}", style("Linked:").bold(), format_number(stats.linked));
        println!(
            "  {} {}",
            style("Reclaimed:").bold(),
            format_size(stats.reclaimed_bytes, BINARY)
        );
    }
    if stats.mismatches > 0 {
        println!(
            "  {} {}",
            style("Name mismatches:").yellow().bold(),
            format_number(stats.mismatches)
        );
    }
    if stats.missing_in_destination + stats.missing_in_source > 0 {
        println!(
            "  {} {} in destination, {} in source",
            style("Missing:").yellow().bold(),
            format_number(stats.missing_in_destination),
            format_number(stats.missing_in_source)
        );
    }
    if stats.errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(stats.errors)
        );
    }
    println!(
        "  {} {:.1}s",
        style("Duration:").bold(),
        stats.duration.as_secs_f64()
    );
    println!();
}

/// Digits grouped in threes, e.g. `1,234,567`
fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Print a header at the start of the run
pub fn print_header(source: &str, destination: &str, mode: &str) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("hlink").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("From:").bold(), source);
    eprintln!("  {} {}", style("To:").bold(), destination);
    eprintln!("  {} {}", style("Mode:").bold(), mode);
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(100_000), "100,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
