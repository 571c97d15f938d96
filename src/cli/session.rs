//! Interactive session and batch-mode orchestration

use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::batch::{BatchDriver, RunSummary};
use crate::cli::args::Cli;
use crate::cli::prompt::Prompter;
use crate::extractor::{cookies, CookieSource, DownloadOptions, YtdlpRunner};
use crate::formats::FormatSelection;
use crate::input::{self, classify, InputLine};
use crate::utils::{paths, AppSettings};

/// One ripbox run: resolved settings, a yt-dlp runner and an input reader
pub struct Session<R> {
    prompter: Prompter<R>,
    runner: YtdlpRunner,
    settings: AppSettings,
    base_dir: PathBuf,
    cookies: CookieSource,
    token: CancellationToken,
}

impl<R: BufRead> Session<R> {
    pub fn new(
        prompter: Prompter<R>,
        runner: YtdlpRunner,
        settings: AppSettings,
        base_dir: PathBuf,
        cookies: CookieSource,
        token: CancellationToken,
    ) -> Self {
        Self {
            prompter,
            runner,
            settings,
            base_dir,
            cookies,
            token,
        }
    }

    /// Interactive loop: URL → subfolder → formats → run, until an empty
    /// URL answer or an interrupt.
    pub async fn interactive(&mut self) -> Result<RunSummary> {
        println!("=== Universal video downloader (YouTube / X / Instagram / TikTok / Facebook) ===");
        println!("Empty URL -> exit.\n");
        println!("[i] Base folder: {}", self.base_dir.display());

        let mut session_summary = RunSummary::default();

        loop {
            if self.token.is_cancelled() {
                session_summary.interrupted = true;
                break;
            }

            let url = self.prompter.ask("→ Paste URL: ");
            if self.token.is_cancelled() {
                session_summary.interrupted = true;
                break;
            }
            if url.is_empty() {
                println!("Done. Bye!");
                break;
            }

            let target = self
                .prompter
                .ask("→ Output subfolder (relative to the base folder, empty = base): ");
            let out_dir = match paths::resolve_output_dir(&self.base_dir, &target) {
                Ok(dir) => dir,
                Err(e) => {
                    // A bad hint is re-asked; only filesystem trouble is fatal
                    println!("❌ {}", e);
                    continue;
                }
            };
            tokio::fs::create_dir_all(&out_dir)
                .await
                .with_context(|| format!("Failed to create output folder {}", out_dir.display()))?;

            println!("[i] Saving to: {}", out_dir.display());

            let selection = self.prompter.choose_formats(&self.settings.default_formats);
            let labels: Vec<String> = selection.formats.iter().map(|f| f.to_string()).collect();
            println!("[i] Export(s): {}", labels.join(", "));

            let summary = self
                .run_batch(vec![InputLine::interactive(url)], out_dir, &selection)
                .await;
            session_summary.merge(&summary);

            if summary.interrupted {
                break;
            }

            if summary.failed > 0 {
                println!("\n⚠️ Finished with some errors.\n");
            } else {
                println!("\n✅ All exports complete.\n");
            }
        }

        if session_summary.total() > 0 {
            println!("Session total: {}", session_summary);
        }

        Ok(session_summary)
    }

    /// Batch mode: URLs come from a file, nothing is prompted. A bad output
    /// hint is fatal here since there is nobody to re-ask.
    pub async fn batch(
        &mut self,
        lines: Vec<InputLine>,
        output_hint: &str,
        format_tokens: Option<&str>,
    ) -> Result<RunSummary> {
        let out_dir = paths::ensure_output_dir(&self.base_dir, output_hint).await?;
        println!("[i] Saving to: {}", out_dir.display());

        let tokens = format_tokens.unwrap_or(&self.settings.default_formats);
        let selection = FormatSelection::parse(tokens);
        for token in &selection.ignored {
            warn!("Ignoring unknown format token '{}'", token);
        }
        let labels: Vec<String> = selection.formats.iter().map(|f| f.to_string()).collect();
        println!("[i] Export(s): {}", labels.join(", "));

        Ok(self.run_batch(lines, out_dir, &selection).await)
    }

    async fn run_batch(
        &self,
        lines: Vec<InputLine>,
        out_dir: PathBuf,
        selection: &FormatSelection,
    ) -> RunSummary {
        let options = DownloadOptions::detect(out_dir, self.cookies.clone());
        let driver = BatchDriver::new(&self.runner, self.token.clone());
        driver
            .run(classify(lines).collect(), &selection.formats, &options)
            .await
    }
}

/// Entry point called from main: wires settings, discovery, cookies and the
/// interrupt listener, then dispatches to batch or interactive mode.
pub async fn run(cli: Cli) -> Result<i32> {
    let settings_path = AppSettings::default_path();
    let settings = AppSettings::load(&settings_path).await;

    // First run: write the defaults out so there is a file to edit
    if !settings_path.exists() {
        if let Err(e) = settings.save(&settings_path).await {
            debug!("Could not write default settings: {:#}", e);
        }
    }

    let base_dir = match &cli.base_dir {
        Some(raw) => paths::absolute_base(raw)?,
        None => settings.base_dir.clone(),
    };

    let runner = build_runner(&cli)?;
    match runner.version().await {
        Ok(version) => info!(
            "Using yt-dlp {} at {}",
            version,
            runner.ytdlp_path().display()
        ),
        Err(e) => warn!("Could not determine yt-dlp version: {}", e),
    }

    let explicit_cookies = cli.cookies.as_ref().map(|raw| paths::expand_tilde(raw));
    let cookies = cookies::resolve(
        explicit_cookies.as_deref(),
        &paths::config_dir().join("cookies.txt"),
        &settings.browser_priority,
    );
    println!("[i] Cookies: {}", cookies);

    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, finishing the current item");
                token.cancel();
            }
        });
    }

    let prompter = Prompter::new(std::io::stdin().lock());
    let mut session = Session::new(prompter, runner, settings, base_dir, cookies, token);

    if let Some(path) = &cli.batch_file {
        match input::read_batch_file(path).await {
            Ok(lines) => {
                let summary = session
                    .batch(
                        lines,
                        cli.output.as_deref().unwrap_or(""),
                        cli.formats.as_deref(),
                    )
                    .await?;
                return Ok(summary.exit_code());
            }
            Err(e) => {
                warn!("{:#}; falling back to the interactive session", e);
            }
        }
    }

    let summary = session.interactive().await?;
    Ok(summary.exit_code())
}

fn build_runner(cli: &Cli) -> Result<YtdlpRunner> {
    let result = match &cli.ytdlp_path {
        Some(path) => YtdlpRunner::with_path(path.clone()),
        None => YtdlpRunner::new(),
    };

    result.map_err(|e| {
        eprintln!("yt-dlp is required but could not be used.");
        eprintln!("Please install yt-dlp:");
        eprintln!("  pip install yt-dlp");
        eprintln!("  or: brew install yt-dlp");
        eprintln!("  or visit: https://github.com/yt-dlp/yt-dlp");
        e
    })
}
