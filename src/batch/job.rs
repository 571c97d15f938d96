//! Job model for the sequential batch

use std::fmt;

use crate::formats::ExportFormat;
use crate::input::ValidatedUrl;

/// One (URL, format) unit of work
#[derive(Debug, Clone)]
pub struct Job {
    pub url: ValidatedUrl,
    pub format: ExportFormat,
    pub status: JobStatus,
}

impl Job {
    pub fn new(url: ValidatedUrl, format: ExportFormat) -> Self {
        Self {
            url,
            format,
            status: JobStatus::Pending,
        }
    }
}

/// Job status; terminal states never transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Skipped(String),
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending | JobStatus::Running)
    }
}

/// Builds the job list: every validated URL crossed with every selected
/// format, URLs in input order, formats in selection order.
pub fn build_jobs(urls: &[ValidatedUrl], formats: &[ExportFormat]) -> Vec<Job> {
    let mut jobs = Vec::with_capacity(urls.len() * formats.len());

    for url in urls {
        for format in formats {
            jobs.push(Job::new(url.clone(), *format));
        }
    }

    jobs
}

/// Counts of completed items for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: bool,
}

impl RunSummary {
    /// Record a terminal job status. Pending/Running jobs are never counted.
    pub fn record(&mut self, status: &JobStatus) {
        match status {
            JobStatus::Succeeded => self.succeeded += 1,
            JobStatus::Skipped(_) => self.skipped += 1,
            JobStatus::Failed(_) => self.failed += 1,
            JobStatus::Pending | JobStatus::Running => {}
        }
    }

    /// Fold another batch into a session-wide summary.
    pub fn merge(&mut self, other: &RunSummary) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.interrupted |= other.interrupted;
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// Zero iff nothing failed; skips never taint the exit code.
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} skipped, {} failed",
            self.succeeded, self.skipped, self.failed
        )?;
        if self.interrupted {
            write!(f, " (interrupted)")?;
        }
        Ok(())
    }
}
