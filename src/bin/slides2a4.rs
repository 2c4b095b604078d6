//! CLI binary for edgequake-slides2a4.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `MergeConfig`, writes the archive and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_slides2a4::convert::write_atomic;
use edgequake_slides2a4::pipeline::archive::ARCHIVE_NAME;
use edgequake_slides2a4::{
    inspect_with_config, merge_inputs, FailurePolicy, MergeConfig, MergeProgressCallback,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the files of the batch plus a
/// log line per finished file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Wall-clock start of the file currently being merged.
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading decks…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl MergeProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Merging");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Merging {total_files} deck(s)…"))
        ));
    }

    fn on_file_start(&self, _file_num: usize, _total: usize, name: &str) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar.set_message(name.to_string());
    }

    fn on_file_complete(&self, file_num: usize, total: usize, name: &str, output_pages: usize) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            green("✓"),
            file_num,
            total,
            name,
            dim(&format!("{output_pages:>3} A4 pages")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, file_num: usize, total: usize, name: &str, error: &str) {
        let secs = self.elapsed_secs();

        let first_line = error.lines().next().unwrap_or(error);
        let msg = if first_line.chars().count() > 80 {
            let cut: String = first_line.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            red("✗"),
            file_num,
            total,
            name,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total_files: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Three slides per A4 page (default), archive in ./merged_pdfs.zip
  slides2a4 lecture-01.pdf lecture-02.pdf

  # Two slides per page, custom archive path
  slides2a4 -s 2 -o handouts.zip decks/*.pdf

  # Also write every <stem>_merged.pdf into a directory
  slides2a4 --out-dir handouts/ lecture-01.pdf

  # Keep going when one deck is broken
  slides2a4 --skip-failed decks/*.pdf

  # Merge a deck straight from a URL
  slides2a4 https://example.com/slides/week-3.pdf

  # Inspect deck metadata only
  slides2a4 --inspect-only lecture-01.pdf

LAYOUT:
  Fixed A4 (595.27 × 841.89 pt) with a light-grey 5 mm grid. Slides are
  stacked top to bottom, each as tall as 1/N of the page, right-aligned
  10 pt from the right edge. Output is grayscale.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH             Path to libpdfium (file or directory)
  SLIDES2A4_SLIDES_PER_PAGE   Same as --slides-per-page
  SLIDES2A4_OUTPUT            Same as --output
  RUST_LOG                    Override log filter (e.g. edgequake_slides2a4=debug)
"#;

/// Lay out PDF slide decks onto gridded A4 handout pages.
#[derive(Parser, Debug)]
#[command(
    name = "slides2a4",
    version,
    about = "Lay out PDF slide decks onto gridded A4 handout pages",
    long_about = "Rasterise each slide deck, stack a fixed number of slides per A4 page over a \
faint 5 mm note-taking grid, save each deck as <stem>_merged.pdf and pack them all into one \
zip archive.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file paths or HTTP/HTTPS URLs.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Write the zip archive to this path.
    #[arg(short, long, env = "SLIDES2A4_OUTPUT", default_value = ARCHIVE_NAME)]
    output: PathBuf,

    /// Slides stacked on each A4 page (1–6).
    #[arg(short, long, env = "SLIDES2A4_SLIDES_PER_PAGE", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..=6))]
    slides_per_page: u32,

    /// Rasterisation DPI (72–400).
    #[arg(long, env = "SLIDES2A4_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// PDF user password for encrypted decks.
    #[arg(long, env = "SLIDES2A4_PASSWORD")]
    password: Option<String>,

    /// Skip decks that fail instead of aborting the whole batch.
    #[arg(long, env = "SLIDES2A4_SKIP_FAILED")]
    skip_failed: bool,

    /// Also write every merged PDF into this directory.
    #[arg(long, env = "SLIDES2A4_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Print deck metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print batch statistics (or metadata) as JSON.
    #[arg(long, env = "SLIDES2A4_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SLIDES2A4_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SLIDES2A4_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SLIDES2A4_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "SLIDES2A4_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
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

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let config = build_config(&cli, None)?;
        for input in &cli.inputs {
            let meta = inspect_with_config(input, &config)
                .await
                .with_context(|| format!("Failed to inspect {input}"))?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
                );
            } else {
                println!("File:         {}", input);
                if let Some(ref t) = meta.title {
                    println!("Title:        {}", t);
                }
                if let Some(ref a) = meta.author {
                    println!("Author:       {}", a);
                }
                println!("Slides:       {}", meta.page_count);
                println!(
                    "A4 pages:     {} at {} per page",
                    meta.page_count.div_ceil(cli.slides_per_page as usize),
                    cli.slides_per_page
                );
                println!("PDF Version:  {}", meta.pdf_version);
                if let Some(ref p) = meta.producer {
                    println!("Producer:     {}", p);
                }
                println!();
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn MergeProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run merge ────────────────────────────────────────────────────────
    let output = merge_inputs(&cli.inputs, &config)
        .await
        .context("Merge failed")?;

    write_atomic(&cli.output, &output.archive)
        .await
        .context("Failed to write archive")?;

    if let Some(ref dir) = cli.out_dir {
        for doc in &output.documents {
            write_atomic(&dir.join(&doc.name), &doc.pdf)
                .await
                .with_context(|| format!("Failed to write {}", doc.name))?;
        }
    }

    if cli.json {
        let json = serde_json::json!({
            "archive": cli.output,
            "stats": output.stats,
            "failures": output.failures,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to serialise stats")?
        );
        return Ok(());
    }

    if !cli.quiet {
        for failure in &output.failures {
            eprintln!("{} skipped {}: {}", red("✗"), failure.name, failure.error);
        }
        // Only a fully successful batch gets the green tick.
        let marker = if output.is_complete() {
            green("✔")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{}  {}/{} decks  {} A4 pages  {}ms  →  {}",
            marker,
            output.stats.merged_files,
            output.stats.total_files,
            output.stats.total_output_pages,
            output.stats.total_duration_ms,
            bold(&cli.output.display().to_string()),
        );
        eprintln!(
            "   {} slides  /  {}",
            dim(&output.stats.total_slides.to_string()),
            dim(&format!("{} bytes", output.stats.archive_bytes)),
        );
    }

    Ok(())
}

/// Map CLI args to `MergeConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<MergeConfig> {
    let policy = if cli.skip_failed {
        FailurePolicy::Skip
    } else {
        FailurePolicy::Abort
    };

    let mut builder = MergeConfig::builder()
        .slides_per_page(cli.slides_per_page as usize)
        .dpi(cli.dpi)
        .failure_policy(policy)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
