use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

use usupack_core::ArchTag;
use usupack_installer::{DeletionReport, ExtractionReport};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputStyle {
    Plain,
    Rich,
}

pub fn current_output_style() -> OutputStyle {
    if std::io::stdout().is_terminal() {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub fn print_status(status: &str, message: &str) {
    println!("{}", render_status_line(current_output_style(), status, message));
}

pub fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("[{status}] {message}"),
        OutputStyle::Rich => format!("{} {message}", colorize(status_style(status), status)),
    }
}

pub fn extraction_spinner(label: &str) -> Option<ProgressBar> {
    if current_output_style() != OutputStyle::Rich {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("{label} in progress"));
    spinner.enable_steady_tick(Duration::from_millis(80));
    Some(spinner)
}

pub fn format_extraction_summary(report: &ExtractionReport, app_root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Extracted {} files ({}) to {}",
        report.files_written,
        HumanBytes(report.bytes_copied),
        app_root.display()
    )];
    if report.skipped > 0 {
        lines.push(format!("Skipped {} unrecognized entries", report.skipped));
    }
    if report.failed > 0 {
        lines.push(format!(
            "Failed to write {} entries (see log for details)",
            report.failed
        ));
    }
    if report.cancelled {
        lines.push("Extraction was cancelled before completion".to_string());
    }
    lines
}

pub fn format_deletion_summary(report: &DeletionReport) -> Vec<String> {
    let mut lines = vec![format!("Removed {} files", report.files_deleted)];
    if report.failed > 0 {
        lines.push(format!(
            "Failed to remove {} entries (see log for details)",
            report.failed
        ));
    }
    lines
}

pub fn format_status_lines(arch: ArchTag, app_root: &Path, installed: bool) -> Vec<String> {
    let state = if installed {
        "installed (bin/su present)"
    } else {
        "not installed"
    };
    vec![
        format!("architecture: {}", arch.as_str()),
        format!("app root: {}", app_root.display()),
        format!("state: {state}"),
    ]
}

fn status_style(status: &str) -> Style {
    let color = match status {
        "ok" => AnsiColor::Green,
        "warn" => AnsiColor::Yellow,
        _ => AnsiColor::Red,
    };
    Style::new().fg_color(Some(color.into())).effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
