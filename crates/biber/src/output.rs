//! Terminal reporting for CLI commands.

use std::time::Duration;

use biber_config::Config;
use console::{Style, Term};

use crate::error::CliError;
use crate::site::BuildReport;

/// How a reported line is colored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
    Plain,
    Done,
    Warn,
    Fail,
}

/// Writes command progress and results to stderr.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Print the blog a build reads and where it writes to.
    pub(crate) fn build_settings(&self, config: &Config) {
        let blog = &config.blog_resolved;
        self.line(Tone::Plain, &format!("Blog: {}", blog.title));
        self.line(Tone::Plain, &format!("Posts: {}", blog.input.display()));
        self.line(Tone::Plain, &format!("Output: {}", blog.output.display()));
    }

    /// Print the warnings, failures and summary of a finished build.
    ///
    /// Returns [`CliError::BuildFailed`] when any post failed.
    pub(crate) fn build_report(&self, report: &BuildReport, elapsed: Duration) -> Result<(), CliError> {
        for (tone, line) in report_lines(report, elapsed) {
            self.line(tone, &line);
        }
        if report.failures.is_empty() {
            Ok(())
        } else {
            Err(CliError::BuildFailed(report.failures.len()))
        }
    }

    /// Print the error that ended a command.
    pub(crate) fn fatal(&self, err: &CliError) {
        self.line(Tone::Fail, &format!("Error: {err}"));
    }

    fn line(&self, tone: Tone, text: &str) {
        let style = match tone {
            Tone::Plain => Style::new(),
            Tone::Done => Style::new().green(),
            Tone::Warn => Style::new().yellow(),
            Tone::Fail => Style::new().red(),
        };
        let _ = self.term.write_line(&style.apply_to(text).to_string());
    }
}

/// Lines of a build report, in print order.
fn report_lines(report: &BuildReport, elapsed: Duration) -> Vec<(Tone, String)> {
    let mut lines = Vec::with_capacity(report.warnings.len() + report.failures.len() + 1);
    lines.extend(
        report
            .warnings
            .iter()
            .map(|warning| (Tone::Warn, format!("Warning: {warning}"))),
    );
    lines.extend(
        report
            .failures
            .iter()
            .map(|failure| (Tone::Fail, failure.to_string())),
    );

    let summary = format!(
        "Built {} post(s), {} up to date, in {elapsed:.2?}",
        report.built, report.skipped
    );
    let tone = if report.failures.is_empty() {
        Tone::Done
    } else {
        Tone::Plain
    };
    lines.push((tone, summary));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_build_summary() {
        let report = BuildReport {
            built: 3,
            skipped: 1,
            ..BuildReport::default()
        };
        assert_eq!(
            report_lines(&report, Duration::from_millis(1500)),
            vec![(Tone::Done, "Built 3 post(s), 1 up to date, in 1.50s".to_owned())]
        );
        assert!(Output::new().build_report(&report, Duration::ZERO).is_ok());
    }

    #[test]
    fn test_warnings_then_failures_then_summary() {
        let report = BuildReport {
            built: 1,
            skipped: 0,
            failures: vec![CliError::Validation("bad.post: broken".to_owned())],
            warnings: vec!["no assets_dir".to_owned()],
        };
        let lines = report_lines(&report, Duration::ZERO);
        assert_eq!(
            lines,
            vec![
                (Tone::Warn, "Warning: no assets_dir".to_owned()),
                (Tone::Fail, "bad.post: broken".to_owned()),
                (Tone::Plain, "Built 1 post(s), 0 up to date, in 0.00ns".to_owned()),
            ]
        );
        assert!(matches!(
            Output::new().build_report(&report, Duration::ZERO),
            Err(CliError::BuildFailed(1))
        ));
    }
}
