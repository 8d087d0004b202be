use crate::rules::{Diagnostic, Severity};
use colored::Colorize;

pub fn report(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("{}", "No performance issues found.".green());
        return;
    }

    for diagnostic in diagnostics {
        print_diagnostic(diagnostic);
    }

    let (error_count, warning_count, info_count) = count_by_severity(diagnostics);
    let mut parts = Vec::with_capacity(3);
    if error_count > 0 {
        parts.push(format!("{} error(s)", error_count).red().to_string());
    }
    if warning_count > 0 {
        parts.push(format!("{} warning(s)", warning_count).yellow().to_string());
    }
    if info_count > 0 {
        parts.push(format!("{} info(s)", info_count).blue().to_string());
    }
    println!();
    println!("Found {}", parts.join(", "));
}

fn print_diagnostic(d: &Diagnostic) {
    let severity_str = match d.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue().bold(),
    };

    let category = format!("({})", d.category).dimmed();

    println!("{}{} {} {}", severity_str, ":".bold(), d.message, category);

    println!(
        "  {} {}:{}:{}",
        "-->".blue(),
        d.file_path.display(),
        d.line,
        d.column,
    );

    println!();
}

/// Format a diagnostic as a plain text string (no colors) for testing.
#[cfg(test)]
fn format_diagnostic_plain(d: &Diagnostic) -> String {
    format!(
        "{}: {} ({})\n  --> {}:{}:{}\n",
        d.severity,
        d.message,
        d.category,
        d.file_path.display(),
        d.line,
        d.column
    )
}

/// Count diagnostics by severity.
pub fn count_by_severity(diagnostics: &[Diagnostic]) -> (usize, usize, usize) {
    diagnostics
        .iter()
        .fold((0, 0, 0), |(errors, warnings, infos), d| match d.severity {
            Severity::Error => (errors + 1, warnings, infos),
            Severity::Warning => (errors, warnings + 1, infos),
            Severity::Info => (errors, warnings, infos + 1),
        })
}
