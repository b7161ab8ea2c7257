//! CLI binary for pdf2text.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2text::{
    extract, extract_to_file, inspect, ExtractionConfig, ExtractionProgressCallback,
    ProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar that tracks the render phase, then
/// resets for the recognition phase. Recognition events may arrive
/// out-of-order (concurrent mode); the bar tracks the completion count, not
/// page numbers.
struct CliProgressCallback {
    bar: ProgressBar,
    ocr_phase: AtomicBool,
    render_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            ocr_phase: AtomicBool::new(false),
            render_errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, prefix: &'static str, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(prefix);
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_pages: usize) {
        self.activate_bar("Rendering", total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("No embedded text — OCR over {total_pages} pages…"))
        ));
    }

    fn on_page_rendered(&self, _page_num: usize, _total_pages: usize) {
        self.bar.inc(1);
    }

    fn on_page_render_error(&self, page_num: usize, total_pages: usize, error: &str) {
        self.render_errors.fetch_add(1, Ordering::SeqCst);
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Page {page_num:>3}/{total_pages:<3}  {}",
            red("✗"),
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_image_recognized(&self, done: usize, total_images: usize, fragments: usize) {
        if !self.ocr_phase.swap(true, Ordering::SeqCst) {
            self.activate_bar("Recognising", total_images);
        }
        self.bar.set_position(done as u64);
        if fragments == 0 {
            self.bar.println(format!(
                "  {} image {done}/{total_images}  {}",
                red("✗"),
                dim("no text"),
            ));
        }
    }

    fn on_run_complete(&self, total_images: usize, recognized: usize) {
        let failed = total_images.saturating_sub(recognized);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} page images recognised",
                green("✔"),
                bold(&recognized.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} page images recognised  ({} failed)",
                if failed == total_images { red("✘") } else { cyan("⚠") },
                bold(&recognized.to_string()),
                total_images,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic extraction (stdout)
  pdf2text document.pdf

  # Extract to file
  pdf2text scan.pdf -o scan.txt

  # German OCR, page-ordered output
  pdf2text --language deu --sequential scan.pdf

  # Refuse OCR: embedded text or nothing
  pdf2text --no-ocr document.pdf

  # Sharper rasterisation for small print
  pdf2text --scale 3.0 scan.pdf

  # Inspect PDF metadata (no OCR engine needed)
  pdf2text --inspect-only document.pdf

  # JSON run report
  pdf2text --json scan.pdf > report.json

OCR LANGUAGES:
  Languages use Tesseract codes (eng, deu, fra, spa, …) and can be combined
  with '+', e.g. --language eng+deu. The matching .traineddata files must be
  installed; most distros package them as tesseract-ocr-<lang>.

ENVIRONMENT VARIABLES:
  TESSDATA_PREFIX          Directory containing Tesseract .traineddata files
  PDFIUM_DYNAMIC_LIB_PATH  Directory containing libpdfium
"#;

/// Extract plain text from PDF documents, with OCR fallback for scanned pages.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2text",
    version,
    about = "Extract plain text from PDF documents, with OCR fallback for scanned pages",
    long_about = "Extract plain text from PDF documents. Embedded text is read directly; \
documents without a text layer (scans) are rasterised page by page and recognised with \
Tesseract. Page images are temporary and always cleaned up.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF file to process.
    input: PathBuf,

    /// Write extracted text to this file instead of stdout.
    #[arg(short, long, env = "PDF2TEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// OCR language code (Tesseract style, e.g. eng, deu, eng+deu).
    #[arg(short, long, env = "PDF2TEXT_LANGUAGE", default_value = "eng")]
    language: String,

    /// Directory containing Tesseract trained data (overrides TESSDATA_PREFIX).
    #[arg(long, env = "PDF2TEXT_TESSDATA")]
    tessdata: Option<PathBuf>,

    /// Rasterisation magnification factor (1.0–4.0).
    #[arg(long, env = "PDF2TEXT_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Recognise page images one at a time, in page order.
    #[arg(long, env = "PDF2TEXT_SEQUENTIAL")]
    sequential: bool,

    /// OCR worker-pool size (concurrent mode).
    #[arg(short, long, env = "PDF2TEXT_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Disable the OCR fallback: fail if the PDF has no embedded text.
    #[arg(long, env = "PDF2TEXT_NO_OCR")]
    no_ocr: bool,

    /// Output a structured JSON run report instead of plain text.
    #[arg(long, env = "PDF2TEXT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TEXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = extract_to_file(&cli.input, output_path, &config)
            .await
            .context("Extraction failed")?;

        // Print the output path on success, summary to stderr.
        println!("{}", output_path.display());
        if !cli.quiet {
            eprintln!(
                "{}  {} fragments from {}/{} pages  {}ms  →  {}",
                if stats.rendered_pages == stats.recognized_images {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.fragment_count,
                stats.recognized_images,
                stats.total_pages,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let output = extract(&cli.input, &config)
            .await
            .context("Extraction failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.text.as_bytes())
                .context("Failed to write to stdout")?;
            // Ensure a trailing newline on stdout.
            if !output.text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !show_progress && !cli.json {
            eprintln!(
                "Extracted {:?} text in {}ms",
                output.source, output.stats.total_duration_ms
            );
            if !output.page_errors.is_empty() {
                eprintln!("  {} pages/images failed", output.page_errors.len());
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .language(cli.language.as_str())
        .scale(cli.scale)
        .parallel_ocr(!cli.sequential)
        .concurrency(cli.concurrency)
        .allow_ocr(!cli.no_ocr);

    if let Some(ref tessdata) = cli.tessdata {
        builder = builder.datapath(tessdata);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
