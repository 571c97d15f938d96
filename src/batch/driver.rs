//! Sequential batch driver
//!
//! Processes the (URL × format) job list strictly in order, one child at a
//! time. A failed job never stops the batch; cancellation is sampled between
//! jobs, never by preempting a running child.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::job::{build_jobs, Job, JobStatus, RunSummary};
use crate::extractor::options::DownloadOptions;
use crate::extractor::ytdlp::{classify_failure, FailureKind, YtdlpRunner};
use crate::formats::ExportFormat;
use crate::input::Classified;

/// Drives one batch of jobs through yt-dlp
pub struct BatchDriver<'a> {
    runner: &'a YtdlpRunner,
    token: CancellationToken,
}

impl<'a> BatchDriver<'a> {
    pub fn new(runner: &'a YtdlpRunner, token: CancellationToken) -> Self {
        Self { runner, token }
    }

    /// Runs every job for this batch and returns the summary of completed
    /// items. Rejected input lines are counted as skipped up front.
    pub async fn run(
        &self,
        classified: Vec<Classified>,
        formats: &[ExportFormat],
        options: &DownloadOptions,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        let mut urls = Vec::new();
        for item in classified {
            match item {
                Classified::Url(url) => urls.push(url),
                Classified::Rejected { line_no, reason } => {
                    warn!("Rejected input line {}: {}", line_no, reason);
                    println!("⚠️ Skipping line {}: {}", line_no, reason);
                    summary.skipped += 1;
                }
            }
        }

        let mut jobs = build_jobs(&urls, formats);
        let total = jobs.len();
        let started = Utc::now();
        info!("Starting batch of {} job(s)", total);

        let mut interrupted = false;

        for (idx, job) in jobs.iter_mut().enumerate() {
            if self.token.is_cancelled() {
                interrupted = true;
                break;
            }

            println!("\n=== [{}/{}] {} -> {} ===", idx + 1, total, job.url.url, job.format);
            debug!("Job {}/{} is a {} source", idx + 1, total, job.url.platform);

            job.status = JobStatus::Running;
            let status = self.execute(job, options).await;
            let cancelled = self.token.is_cancelled();

            // An item that goes down together with the interrupt is not a
            // real result; only completed items reach the summary.
            if cancelled && status != JobStatus::Succeeded {
                interrupted = true;
                break;
            }

            match &status {
                JobStatus::Succeeded => println!("✅ Done: {}", job.format),
                JobStatus::Skipped(reason) => println!("⚠️ Skipped: {}: {}", job.format, reason),
                JobStatus::Failed(reason) => println!("❌ Failed: {}: {}", job.format, reason),
                JobStatus::Pending | JobStatus::Running => {}
            }

            job.status = status;
            summary.record(&job.status);

            if cancelled {
                interrupted = true;
                break;
            }
        }

        if interrupted {
            summary.interrupted = true;
            println!("\n⚠️ Cancelled by user.");
            let never_attempted = jobs.iter().filter(|j| j.status == JobStatus::Pending).count();
            debug!("{} job(s) never attempted", never_attempted);
        }

        info!(
            "Batch finished in {} s: {}",
            (Utc::now() - started).num_seconds(),
            summary
        );
        println!("\nSummary: {}", summary);

        summary
    }

    async fn execute(&self, job: &Job, options: &DownloadOptions) -> JobStatus {
        match self.runner.run(&job.url.url, job.format, options).await {
            Ok(report) if report.succeeded() => JobStatus::Succeeded,
            Ok(report) => {
                let reason = report.failure_reason();
                match classify_failure(&reason) {
                    FailureKind::SourceUnavailable => JobStatus::Skipped(reason),
                    FailureKind::Tool => JobStatus::Failed(reason),
                }
            }
            Err(e) => JobStatus::Failed(format!("{:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::cookies::CookieSource;
    use crate::input::{classify, InputLine, InputSource};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn options(dir: &Path) -> DownloadOptions {
        DownloadOptions {
            output_dir: dir.to_path_buf(),
            cookies: CookieSource::None,
            node_path: None,
            po_token: None,
        }
    }

    fn classified(texts: &[&str]) -> Vec<Classified> {
        classify(texts.iter().enumerate().map(|(idx, text)| InputLine {
            text: text.to_string(),
            source: InputSource::File,
            line_no: idx + 1,
        }))
        .collect()
    }

    #[cfg(unix)]
    fn fake_ytdlp(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rejected_lines_skip_and_failures_do_not_abort() {
        let temp_dir = TempDir::new().unwrap();
        let script = fake_ytdlp(temp_dir.path(), "echo \"ERROR: boom\" >&2\nexit 1");
        let runner = YtdlpRunner::with_path(script).unwrap();
        let driver = BatchDriver::new(&runner, CancellationToken::new());

        let input = classified(&[
            "",
            "https://example.com/video/1",
            "not a url",
            "https://example.com/video/2",
        ]);
        let summary = driver
            .run(input, &[ExportFormat::Mp4], &options(temp_dir.path()))
            .await;

        // Both URLs attempted despite the first failing
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded, 0);
        assert!(!summary.interrupted);
        assert_eq!(summary.exit_code(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_item_does_not_stop_later_items() {
        let temp_dir = TempDir::new().unwrap();
        // Fails for URLs containing "bad", succeeds otherwise
        let body = r#"for last; do :; done
case "$last" in
  *bad*)
    echo "ERROR: boom" >&2
    exit 1
    ;;
  *)
    out="$(dirname "$0")/clip.mp4"
    echo "[download] Destination: $out"
    touch "$out"
    exit 0
    ;;
esac"#;
        let script = fake_ytdlp(temp_dir.path(), body);
        let runner = YtdlpRunner::with_path(script).unwrap();
        let driver = BatchDriver::new(&runner, CancellationToken::new());

        let input = classified(&[
            "https://example.com/bad/1",
            "https://example.com/video/2",
            "https://example.com/video/3",
        ]);
        let summary = driver
            .run(input, &[ExportFormat::Mp4], &options(temp_dir.path()))
            .await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.exit_code(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_jobs_verify_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let body = r#"out="$(dirname "$0")/clip.mp4"
echo "[download] Destination: $out"
touch "$out"
exit 0"#;
        let script = fake_ytdlp(temp_dir.path(), body);
        let runner = YtdlpRunner::with_path(script).unwrap();
        let driver = BatchDriver::new(&runner, CancellationToken::new());

        let input = classified(&["https://example.com/video/1"]);
        let summary = driver
            .run(
                input,
                &[ExportFormat::Mp4, ExportFormat::Mp3],
                &options(temp_dir.path()),
            )
            .await;

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.exit_code(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unavailable_source_is_skipped_not_failed() {
        let temp_dir = TempDir::new().unwrap();
        let script = fake_ytdlp(
            temp_dir.path(),
            "echo \"ERROR: Private video. Sign in if you've been granted access\" >&2\nexit 1",
        );
        let runner = YtdlpRunner::with_path(script).unwrap();
        let driver = BatchDriver::new(&runner, CancellationToken::new());

        let summary = driver
            .run(
                classified(&["https://example.com/video/1"]),
                &[ExportFormat::Mp4],
                &options(temp_dir.path()),
            )
            .await;

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.exit_code(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_token_attempts_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let script = fake_ytdlp(temp_dir.path(), "exit 0");
        let runner = YtdlpRunner::with_path(script).unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let driver = BatchDriver::new(&runner, token);

        let summary = driver
            .run(
                classified(&["https://example.com/video/1", "https://example.com/video/2"]),
                &[ExportFormat::Mp4],
                &options(temp_dir.path()),
            )
            .await;

        assert_eq!(summary.total(), 0);
        assert!(summary.interrupted);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancellation_mid_batch_counts_only_completed_items() {
        let temp_dir = TempDir::new().unwrap();
        // Each job takes ~1s and fails; the token fires during job 3
        let script = fake_ytdlp(temp_dir.path(), "sleep 1\necho \"ERROR: boom\" >&2\nexit 1");
        let runner = YtdlpRunner::with_path(script).unwrap();

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let driver = BatchDriver::new(&runner, token);
        let urls: Vec<String> = (1..=5).map(|i| format!("https://example.com/video/{}", i)).collect();
        let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();

        let summary = driver
            .run(classified(&url_refs), &[ExportFormat::Mp4], &options(temp_dir.path()))
            .await;

        // Jobs 1 and 2 completed; job 3 went down with the interrupt and is
        // not counted; jobs 4 and 5 were never attempted.
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total(), 2);
        assert!(summary.interrupted);
    }
}
