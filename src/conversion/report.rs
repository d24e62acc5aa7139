//! Conversion report types.
//!
//! A [`ConversionReport`] records what a run actually did: how many planes
//! the traversal visited, how many the destination accepted, and notes on
//! the restrictions and close failures along the way.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A report generated by a conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Source format name.
    pub from: String,
    /// Target format name.
    pub to: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Planes visited by the traversal.
    pub total_planes: u64,
    /// Planes handed to the destination.
    pub written_planes: u64,
    /// Planes beyond the destination's capacity, never read.
    pub skipped_planes: u64,
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    /// Count of info-level issues.
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// True when every visited plane reached the destination.
    pub fn is_complete(&self) -> bool {
        self.written_planes == self.total_planes
    }

    pub fn has_issue(&self, code: ConversionIssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {} of {} plane(s) written",
            self.written_planes, self.total_planes
        )?;
        if self.skipped_planes > 0 {
            writeln!(
                f,
                "  {} plane(s) skipped (destination capacity)",
                self.skipped_planes
            )?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// A single note or warning from a conversion run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// Something did not go as requested.
    Warning,
    /// A restriction or policy the user asked for.
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON schema and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// The destination could not hold every plane.
    PlanesSkipped,
    /// Closing the source or destination failed after the run.
    CloseFailed,
    /// A `--crop` restricted the planar axes.
    CropApplied,
    /// A `--range` restricted the non-planar axes.
    PlaneRangeApplied,
    /// A writer option was requested but the destination ignores it.
    WriterOptionIgnored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_complete() {
        let report = ConversionReport::new("rawstack", "raw");
        assert!(report.is_complete());
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.info_count(), 0);
    }

    #[test]
    fn skipped_planes_show_in_text() {
        let mut report = ConversionReport::new("rawstack", "raw");
        report.total_planes = 4;
        report.written_planes = 1;
        report.skipped_planes = 3;
        report.add(ConversionIssue::warning(
            ConversionIssueCode::PlanesSkipped,
            "3 plane(s) exceed the destination capacity of 1",
        ));

        let text = report.to_string();
        assert!(!report.is_complete());
        assert!(text.contains("1 of 4 plane(s) written"));
        assert!(text.contains("3 plane(s) skipped"));
        assert!(text.contains("Warnings (1):"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = ConversionReport::new("rawstack", "rawstack");
        report.total_planes = 2;
        report.written_planes = 2;
        report.add(ConversionIssue::info(
            ConversionIssueCode::CropApplied,
            "planar axes cropped to X=2 Y=2",
        ));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"from\":\"rawstack\""));
        assert!(json.contains("\"severity\":\"info\""));
        assert!(json.contains("\"code\":\"crop_applied\""));
        assert!(json.contains("\"written_planes\":2"));
    }
}
