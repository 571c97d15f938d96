//! yt-dlp command-line assembly
//!
//! One shared base (retry/progress/naming behavior, extractor args, cookies)
//! plus a per-format overlay: video formats remux into their container, MP3
//! goes through audio extraction.

use std::path::PathBuf;

use crate::extractor::cookies::CookieSource;
use crate::extractor::ytdlp;
use crate::formats::ExportFormat;

/// Environment variable carrying an optional YouTube PO token.
pub const PO_TOKEN_ENV: &str = "YTDLP_PO_TOKEN";

/// Per-run invocation options, fixed once before the batch starts
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Directory the output template points into
    pub output_dir: PathBuf,
    /// Resolved cookie source for every job in this run
    pub cookies: CookieSource,
    /// Node runtime for JS challenge solving, when discoverable
    pub node_path: Option<PathBuf>,
    /// PO token passed through to the YouTube extractor
    pub po_token: Option<String>,
}

impl DownloadOptions {
    /// Builds options for this run, probing the environment for a node
    /// runtime and a PO token.
    pub fn detect(output_dir: PathBuf, cookies: CookieSource) -> Self {
        let node_path = ytdlp::find_node();
        let po_token = std::env::var(PO_TOKEN_ENV)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Self {
            output_dir,
            cookies,
            node_path,
            po_token,
        }
    }

    /// Build the full argument vector for one (URL, format) job.
    pub fn build_args(&self, url: &str, format: ExportFormat) -> Vec<String> {
        let mut args = vec![
            "--ignore-errors".to_string(),
            "--continue".to_string(),
            "--retries".to_string(),
            "10".to_string(),
            "--fragment-retries".to_string(),
            "10".to_string(),
            "--concurrent-fragments".to_string(),
            "4".to_string(),
            "--newline".to_string(),
            "--user-agent".to_string(),
            "Mozilla/5.0".to_string(),
            "--restrict-filenames".to_string(),
            "--trim-filenames".to_string(),
            "200".to_string(),
            "--remote-components".to_string(),
            "ejs:github".to_string(),
        ];

        // JS challenge solving wants an external runtime
        if let Some(node) = &self.node_path {
            args.push("--js-runtimes".to_string());
            args.push(format!("node:{}", node.display()));
        }

        // YouTube client rotation, optionally with a PO token
        let mut youtube_args = String::from("youtube:player_client=tv,mweb,tv_embedded");
        if let Some(token) = &self.po_token {
            youtube_args.push_str(";po_token=");
            youtube_args.push_str(token);
        }
        args.push("--extractor-args".to_string());
        args.push(youtube_args);

        // Cookies
        match &self.cookies {
            CookieSource::File(path) => {
                args.push("--cookies".to_string());
                args.push(path.display().to_string());
            }
            CookieSource::Browser(name) => {
                args.push("--cookies-from-browser".to_string());
                args.push(name.clone());
            }
            CookieSource::None => {}
        }

        // Format selection and container handling
        if format.is_audio_only() {
            args.push("-f".to_string());
            args.push("bestaudio/best".to_string());
            args.push("--extract-audio".to_string());
            args.push("--audio-format".to_string());
            args.push("mp3".to_string());
            args.push("--audio-quality".to_string());
            args.push("0".to_string());
        } else {
            args.push("-f".to_string());
            args.push("bv*+ba/b".to_string());
            args.push("--merge-output-format".to_string());
            args.push(format.extension().to_string());
        }

        args.push("--output".to_string());
        args.push(self.output_template(format));

        args.push(url.to_string());
        args
    }

    /// `<dir>/%(title)s [%(id)s].<ext>`. Video formats pin the extension so
    /// the name matches the remuxed container; audio extraction keeps
    /// `%(ext)s` and lets the post-processor rename to .mp3.
    fn output_template(&self, format: ExportFormat) -> String {
        let template = self
            .output_dir
            .join("%(title)s [%(id)s].%(ext)s")
            .to_string_lossy()
            .into_owned();

        if format.is_audio_only() {
            template
        } else {
            template.replace("%(ext)s", format.extension())
        }
    }
}
