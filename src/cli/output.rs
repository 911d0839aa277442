//! Output formatting for CLI

use crate::pipeline::BatchSummary;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a rate in [0, 1] as a percentage
pub fn format_percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, &str)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Print one row per batch
pub fn print_batch_table(batches: &[BatchSummary]) {
    println!(
        "  {:>5} {:>9} {:>9} {:>12} {:>7} {:>10}",
        "batch", "episodes", "successes", "mean dur (s)", "ratio", "V_max"
    );
    for summary in batches {
        println!(
            "  {:>5} {:>9} {:>9} {:>12.2} {:>7.3} {:>10.4}",
            summary.batch + 1,
            summary.episodes,
            summary.successes,
            summary.mean_duration,
            summary.exploration_ratio,
            summary.max_reference
        );
    }
}
