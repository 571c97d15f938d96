//! Integration-style tests covering the classify -> download -> summarize
//! pipeline without hitting the network.

use ripbox::batch::{build_jobs, BatchDriver};
use ripbox::extractor::{CookieSource, DownloadOptions, YtdlpRunner};
use ripbox::formats::FormatSelection;
use ripbox::input::{classify, read_batch_file, InputLine, InputSource};
use ripbox::utils::AppSettings;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[cfg(unix)]
fn fake_ytdlp(dir: &std::path::Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-yt-dlp");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn file_line(text: &str, line_no: usize) -> InputLine {
    InputLine {
        text: text.to_string(),
        source: InputSource::File,
        line_no,
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_pipeline_mixed_lines_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let script = fake_ytdlp(
        temp_dir.path(),
        r#"out="$(dirname "$0")/clip.mp4"
echo "[download] Destination: $out"
touch "$out"
exit 0"#,
    );
    let runner = YtdlpRunner::with_path(script).unwrap();

    let lines = vec![
        file_line("https://www.youtube.com/watch?v=abc", 1),
        file_line("not a url at all", 2),
        file_line("https://vimeo.com/12345", 3),
        file_line("   ", 4),
    ];

    let selection = FormatSelection::parse("1 4");
    let options = DownloadOptions::detect(temp_dir.path().join("out"), CookieSource::None);
    let driver = BatchDriver::new(&runner, CancellationToken::new());

    let summary = driver
        .run(classify(lines).collect(), &selection.formats, &options)
        .await;

    // 2 valid URLs x 2 formats succeed; the junk line and the blank line
    // are skipped before any job runs
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.exit_code(), 0);
    assert!(!summary.interrupted);
}

#[cfg(unix)]
#[tokio::test]
async fn test_batch_file_from_disk_to_summary() {
    let temp_dir = TempDir::new().unwrap();
    let batch_path = temp_dir.path().join("urls.txt");
    tokio::fs::write(
        &batch_path,
        "# weekend queue\nhttps://example.com/video/1\n\nnot a url\nhttps://example.com/video/2\n",
    )
    .await
    .unwrap();

    let script = fake_ytdlp(
        temp_dir.path(),
        r#"out="$(dirname "$0")/clip.mp4"
echo "[download] Destination: $out"
touch "$out"
exit 0"#,
    );
    let runner = YtdlpRunner::with_path(script).unwrap();

    let lines = read_batch_file(&batch_path).await.unwrap();
    let selection = FormatSelection::parse("1");
    let options = DownloadOptions::detect(temp_dir.path().join("out"), CookieSource::None);
    let driver = BatchDriver::new(&runner, CancellationToken::new());

    let summary = driver
        .run(classify(lines).collect(), &selection.formats, &options)
        .await;

    // Comment line is dropped entirely; blank and junk lines count as skipped
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_pipeline_unavailable_source_counts_as_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let script = fake_ytdlp(
        temp_dir.path(),
        r#"echo "ERROR: [youtube] abc: Private video. Sign in if you've been granted access" >&2
exit 1"#,
    );
    let runner = YtdlpRunner::with_path(script).unwrap();

    let lines = vec![file_line("https://www.youtube.com/watch?v=abc", 1)];
    let selection = FormatSelection::parse("1");
    let options = DownloadOptions::detect(temp_dir.path().join("out"), CookieSource::None);
    let driver = BatchDriver::new(&runner, CancellationToken::new());

    let summary = driver
        .run(classify(lines).collect(), &selection.formats, &options)
        .await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn test_jobs_cover_every_url_format_pair() {
    let lines = vec![
        file_line("https://youtu.be/one", 1),
        file_line("https://x.com/u/status/2", 2),
    ];

    let urls: Vec<_> = classify(lines)
        .filter_map(|item| match item {
            ripbox::input::Classified::Url(url) => Some(url),
            _ => None,
        })
        .collect();
    let selection = FormatSelection::parse("1 2 3 4");

    let jobs = build_jobs(&urls, &selection.formats);
    assert_eq!(jobs.len(), 8);

    // URLs stay in input order, formats cycle within each URL
    assert!(jobs[0].url.url.contains("youtu.be"));
    assert!(jobs[4].url.url.contains("x.com"));
}

#[tokio::test]
async fn test_settings_roundtrip_through_nested_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested/config/settings.json");

    let settings = AppSettings {
        base_dir: PathBuf::from("/media/rips"),
        default_formats: "4".to_string(),
        browser_priority: vec!["firefox".to_string()],
    };
    settings.save(&path).await.unwrap();

    let loaded = AppSettings::load(&path).await;
    assert_eq!(loaded.base_dir, PathBuf::from("/media/rips"));
    assert_eq!(loaded.default_formats, "4");
    assert_eq!(loaded.browser_priority, vec!["firefox".to_string()]);
}

#[test]
fn test_missing_binary_is_reported() {
    let result = YtdlpRunner::with_path(PathBuf::from("/nonexistent/yt-dlp"));
    assert!(result.is_err());
}
