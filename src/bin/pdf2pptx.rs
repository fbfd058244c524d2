//! CLI binary for pdf2pptx-client.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ClientConfig`, feeds each input through a `Session`, and prints the
//! resulting download links.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2pptx_client::{
    ClientConfig, FlowObserver, HttpConversionService, MediaType, Notice, NoticeLevel,
    ObserverHandle, SelectedFile, SelectionCallback, Session,
};
use reqwest::Url;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Terminal observer: a spinner while the service converts, a byte
/// progress bar while the deck downloads.
struct CliObserver {
    /// The bar for the current phase; replaced between phases.
    current: Mutex<Option<ProgressBar>>,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            current: Mutex::new(None),
        })
    }

    fn println(&self, line: String) {
        match self.current.lock().unwrap().as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn clear(&self) {
        if let Some(bar) = self.current.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}

impl SelectionCallback for CliObserver {
    fn on_file_selected(&self, file: &SelectedFile) {
        self.println(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(file.name()),
            dim(&file.describe_size())
        ));
    }
}

impl FlowObserver for CliObserver {
    fn on_upload_start(&self, _file_name: &str, _size: u64) {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.set_message("Converting your deck…");
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Some(old) = self.current.lock().unwrap().replace(bar) {
            old.finish_and_clear();
        }
    }

    fn on_conversion_complete(&self, _download_url: &Url) {
        self.clear();
    }

    fn on_conversion_error(&self, _error: &str) {
        self.clear();
    }

    fn on_download_progress(&self, downloaded: u64, total: Option<u64>) {
        let mut current = self.current.lock().unwrap();
        let bar = current.get_or_insert_with(|| {
            let bar = ProgressBar::new(total.unwrap_or(0));
            let style = ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);
            bar.set_style(style);
            bar.set_prefix("Downloading");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        if let Some(t) = total {
            if bar.length().unwrap_or(0) != t {
                bar.set_length(t);
            }
        }
        bar.set_position(downloaded);
    }

    fn on_download_complete(&self, _bytes: u64) {
        self.clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert and print the download link
  pdf2pptx deck.pdf

  # Convert and save the .pptx next to you
  pdf2pptx deck.pdf -o .

  # Several files into one directory
  pdf2pptx a.pdf b.pdf c.pdf -o out/

  # Point at another conversion service
  pdf2pptx --service-url http://converter.internal:8000 deck.pdf

  # Treat the file as dropped with an explicit declared type
  pdf2pptx --media-type application/pdf scan.bin

  # JSON summary for scripting
  pdf2pptx --json deck.pdf > result.json

CONFIG FILE (--config):
  {
    "serviceBaseUrl": "http://localhost:8000",
    "convertPath": "/convert",
    "fileField": "file",
    "requestTimeoutSecs": 600,
    "downloadTimeoutSecs": 120
  }
  Command-line flags and environment variables override file values.

ENVIRONMENT VARIABLES:
  PDF2PPTX_SERVICE_URL    Base address of the conversion service
  PDF2PPTX_CONFIG         Path to a JSON config file
  PDF2PPTX_OUTPUT         Default --output
  PDF2PPTX_TIMEOUT        Upload request timeout in seconds
  RUST_LOG                Log filter (overrides -v / -q)
"#;

/// Convert PDF files to PowerPoint decks through a conversion service.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2pptx",
    version,
    about = "Convert PDF files to PowerPoint decks through a conversion service",
    long_about = "Upload PDF files to a PDF-to-PowerPoint conversion service, print the \
download link for each converted deck, and optionally save the .pptx locally.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// One or more local PDF files, converted in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Base address of the conversion service.
    #[arg(long, env = "PDF2PPTX_SERVICE_URL")]
    service_url: Option<String>,

    /// JSON config file (camelCase keys, e.g. serviceBaseUrl).
    #[arg(long, env = "PDF2PPTX_CONFIG")]
    config: Option<PathBuf>,

    /// Declared media type; the file goes through the drop path's type check.
    ///
    /// Without it, files go through the picker path (.pdf extension filter).
    #[arg(long)]
    media_type: Option<String>,

    /// Save the converted deck to this file or directory.
    #[arg(short, long, env = "PDF2PPTX_OUTPUT")]
    output: Option<PathBuf>,

    /// Upload request timeout in seconds (none by default).
    #[arg(long, env = "PDF2PPTX_TIMEOUT")]
    timeout: Option<u64>,

    /// Download timeout in seconds.
    #[arg(long, env = "PDF2PPTX_DOWNLOAD_TIMEOUT")]
    download_timeout: Option<u64>,

    /// Output a JSON summary instead of plain links.
    #[arg(long)]
    json: bool,

    /// Disable spinner and progress bar.
    #[arg(long, env = "PDF2PPTX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PPTX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PPTX_QUIET")]
    quiet: bool,
}

/// Per-input outcome for `--json`.
#[derive(Debug, Serialize)]
struct InputSummary {
    input: PathBuf,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    notices: Vec<Notice>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and notices cover what a user needs; library INFO logs
    // would only interleave with them.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress || cli.json {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config and session ─────────────────────────────────────────
    let config = build_config(&cli).await?;
    let service = HttpConversionService::new(&config).context("Failed to set up HTTP client")?;

    let mut session = Session::new(service, config);
    if show_progress {
        let observer = CliObserver::new();
        session = session
            .with_observer(observer.clone() as ObserverHandle)
            .with_selection_callback(observer as Arc<dyn SelectionCallback>);
    }

    if let Some(ref out) = cli.output {
        if cli.inputs.len() > 1 || names_directory(out) {
            tokio::fs::create_dir_all(out)
                .await
                .with_context(|| format!("Failed to create output directory {:?}", out))?;
        }
    }

    // ── Run each input ───────────────────────────────────────────────────
    let mut summaries = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        let outcome = process_input(&mut session, &cli, input).await;
        let notices = session.drain_notices();
        if !cli.json {
            print_notices(&notices, cli.quiet);
        }

        let summary = match outcome {
            Ok((url, saved_to)) => {
                if !cli.json {
                    println!("{url}");
                    if let (Some(path), false) = (&saved_to, cli.quiet) {
                        eprintln!("{} saved to {}", green("✔"), bold(&path.display().to_string()));
                    }
                }
                InputSummary {
                    input: input.clone(),
                    ok: true,
                    download_url: Some(url.to_string()),
                    saved_to,
                    error: None,
                    notices,
                }
            }
            Err(e) => {
                if !cli.json && notices.iter().all(|n| n.level != NoticeLevel::Error) {
                    // Failures that never reached the coordinator (unreadable
                    // file, rejected selection) still need a line.
                    eprintln!("{} {}: {}", red("✘"), input.display(), e);
                }
                InputSummary {
                    input: input.clone(),
                    ok: false,
                    download_url: None,
                    saved_to: None,
                    error: Some(e.to_string()),
                    notices,
                }
            }
        };
        summaries.push(summary);
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summaries).context("Failed to serialise summary")?
        );
    }

    let failed = summaries.iter().filter(|s| !s.ok).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} conversions failed", summaries.len());
    }
    Ok(())
}

/// Read, select, convert and optionally download one input.
async fn process_input(
    session: &mut Session<HttpConversionService>,
    cli: &Cli,
    input: &Path,
) -> Result<(Url, Option<PathBuf>)> {
    let url = match cli.media_type {
        Some(ref declared) => {
            let file = SelectedFile::from_path_as(input, MediaType::new(declared)).await?;
            session.drop_file(file).await?
        }
        None => {
            let file = SelectedFile::from_path(input).await?;
            session.pick_file(file).await?
        }
    };

    let saved_to = match cli.output {
        Some(ref out) => Some(session.download(out).await?),
        None => None,
    };

    Ok((url, saved_to))
}

/// Print notices to stderr; in quiet mode only errors.
fn print_notices(notices: &[Notice], quiet: bool) {
    for notice in notices {
        let line = match notice.level {
            NoticeLevel::Error => format!("{} {}", red("✘"), notice.message),
            _ if quiet => continue,
            NoticeLevel::Warning => format!("{} {}", yellow("⚠"), notice.message),
            NoticeLevel::Success => format!("{} {}", green("✔"), notice.message),
            NoticeLevel::Info => format!("{} {}", cyan("ℹ"), notice.message),
        };
        eprintln!("{line}");
    }
}

/// Map CLI args (and an optional config file) to `ClientConfig`.
/// `-o out/` names a directory even before it exists.
fn names_directory(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR)
}

async fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match cli.config {
        Some(ref path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            ClientConfig::from_json_str(&json)
                .with_context(|| format!("Invalid config file {:?}", path))?
        }
        None => ClientConfig::default(),
    };

    // Flags override file values.
    if let Some(ref url) = cli.service_url {
        config.service_base_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout_secs = Some(secs);
    }
    if let Some(secs) = cli.download_timeout {
        config.download_timeout_secs = secs;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
