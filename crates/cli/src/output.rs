// Summary tables printed after each command

use backup_core::application::{BackupReport, RestoreReport};
use colored::Colorize;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct Row {
    outcome: &'static str,
    count: String,
}

fn row(outcome: &'static str, count: impl ToString) -> Row {
    Row {
        outcome,
        count: count.to_string(),
    }
}

fn seconds(elapsed_ms: i64) -> String {
    format!("{:.1}s", elapsed_ms as f64 / 1000.0)
}

pub fn print_backup(report: &BackupReport, dry_run: bool) {
    let mut rows = vec![
        row("uploaded", report.uploaded),
        row("skipped (exists)", report.skipped),
        row("failed", report.failed),
    ];
    if dry_run {
        rows.push(row("would upload", report.planned));
    }
    rows.push(row("bytes uploaded", report.bytes_uploaded));
    rows.push(row("elapsed", seconds(report.elapsed_ms)));

    println!("{}", Table::new(rows));

    if report.is_success() {
        println!("{}", "✓ Backup complete".green().bold());
    } else {
        println!(
            "{}",
            format!("✗ Backup finished with {} failed file(s)", report.failed)
                .red()
                .bold()
        );
    }
}

pub fn print_restore(report: &RestoreReport, dry_run: bool) {
    let mut rows = vec![
        row("requested", report.requested),
        row("already in progress", report.already_in_progress),
        row("failed", report.failed.len()),
    ];
    if dry_run {
        rows.push(row("would request", report.planned));
    }
    rows.push(row("elapsed", seconds(report.elapsed_ms)));

    println!("{}", Table::new(rows));

    if report.is_success() {
        println!(
            "{}",
            format!("✓ {} restore request(s) processed", report.total())
                .green()
                .bold()
        );
        return;
    }

    println!(
        "{}",
        format!("✗ {} restore request(s) failed:", report.failed.len())
            .red()
            .bold()
    );
    for (key, message) in &report.failed {
        println!("  {} {}: {}", "•".bold(), key, message);
    }
}

pub fn print_listed(count: usize, destination: &str) {
    println!(
        "{}",
        format!("✓ {} key(s) written to {}", count, destination)
            .green()
            .bold()
    );
}
