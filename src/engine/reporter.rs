//! User-facing run output
//!
//! Stages and the pipeline never print directly; they go through a
//! [`Reporter`] constructed once per run. The console implementation
//! colorizes for a terminal, the capture implementation records every line
//! so tests can assert on what a user would have seen.

use std::sync::Mutex;

use colored::Colorize;

pub trait Reporter: Send + Sync {
    /// Heading that opens a stage or a block of output
    fn section(&self, title: &str);

    fn info(&self, message: &str);

    /// Echo of an external command about to run
    fn command(&self, command: &str);

    fn success(&self, message: &str);

    /// Highlighted failure line, written to the error stream
    fn failure(&self, message: &str);

    /// Diagnostic context following a failure
    fn detail(&self, message: &str);

    fn skip(&self, message: &str);

    /// One row of the final summary
    fn stage_status(&self, stage: &str, passed: bool);
}

/// Colorized stdout/stderr output
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        println!("{}", title.bold());
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn command(&self, command: &str) {
        println!("  Running: {}", command.dimmed());
    }

    fn success(&self, message: &str) {
        println!("{}", message.green());
    }

    fn failure(&self, message: &str) {
        eprintln!("{}", message.red());
    }

    fn detail(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn skip(&self, message: &str) {
        println!("{}", message.yellow());
    }

    fn stage_status(&self, stage: &str, passed: bool) {
        let status = if passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!("  {}: {}", stage, status);
    }
}

/// Discards everything
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn section(&self, _title: &str) {}
    fn info(&self, _message: &str) {}
    fn command(&self, _command: &str) {}
    fn success(&self, _message: &str) {}
    fn failure(&self, _message: &str) {}
    fn detail(&self, _message: &str) {}
    fn skip(&self, _message: &str) {}
    fn stage_status(&self, _stage: &str, _passed: bool) {}
}

/// A line recorded by [`CaptureReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Section(String),
    Info(String),
    Command(String),
    Success(String),
    Failure(String),
    Detail(String),
    Skip(String),
    StageStatus { stage: String, passed: bool },
}

/// Records lines in memory for later inspection
#[derive(Debug, Default)]
pub struct CaptureReporter {
    lines: Mutex<Vec<ReportLine>>,
}

impl CaptureReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Echoed commands, in order
    pub fn commands(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| match l {
                ReportLine::Command(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| match l {
                ReportLine::Failure(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn push(&self, line: ReportLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl Reporter for CaptureReporter {
    fn section(&self, title: &str) {
        self.push(ReportLine::Section(title.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(ReportLine::Info(message.to_string()));
    }

    fn command(&self, command: &str) {
        self.push(ReportLine::Command(command.to_string()));
    }

    fn success(&self, message: &str) {
        self.push(ReportLine::Success(message.to_string()));
    }

    fn failure(&self, message: &str) {
        self.push(ReportLine::Failure(message.to_string()));
    }

    fn detail(&self, message: &str) {
        self.push(ReportLine::Detail(message.to_string()));
    }

    fn skip(&self, message: &str) {
        self.push(ReportLine::Skip(message.to_string()));
    }

    fn stage_status(&self, stage: &str, passed: bool) {
        self.push(ReportLine::StageStatus {
            stage: stage.to_string(),
            passed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_reporter_keeps_order() {
        let reporter = CaptureReporter::new();
        reporter.section("Authenticate");
        reporter.command("devpi use https://example.com");
        reporter.failure("Command failed with exit code 1");
        reporter.stage_status("Authenticate", false);

        assert_eq!(
            reporter.lines(),
            vec![
                ReportLine::Section("Authenticate".to_string()),
                ReportLine::Command("devpi use https://example.com".to_string()),
                ReportLine::Failure("Command failed with exit code 1".to_string()),
                ReportLine::StageStatus {
                    stage: "Authenticate".to_string(),
                    passed: false
                },
            ]
        );
        assert_eq!(reporter.commands(), vec!["devpi use https://example.com"]);
        assert_eq!(reporter.failures().len(), 1);
    }
}
