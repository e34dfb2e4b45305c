//! CLI binary for ksef-pdf-client.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ClientConfig`, reads the XML source and writes the rendered PDF.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use ksef_pdf_client::{CancellationToken, ClientConfig, KsefPdfClient, PdfKind};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Invoice visualisation to a file
  ksef-pdf --domain https://pdf.example.com invoice \
      --xml FA_2024_001.xml --nr-ksef 5265877635-20240101-0100A1B2C3D4-E5 \
      --qr-code 'https://ksef.mf.gov.pl/web/verify/...' -o invoice.pdf

  # UPO from stdin to stdout
  cat upo.xml | ksef-pdf --domain https://pdf.example.com upo --xml - > upo.pdf

  # Machine-readable summary
  ksef-pdf --json upo --xml upo.xml -o upo.pdf

ENVIRONMENT VARIABLES:
  KSEF_PDF_DOMAIN         Base URL of the PDF generator service
  KSEF_PDF_API_TOKEN      Value sent in the x-api-token header
  KSEF_PDF_TIMEOUT        Per-request timeout in seconds
  RUST_LOG                Overrides the log filter (e.g. ksef_pdf_client=debug)
"#;

/// Render KSeF invoice and UPO PDFs through the PDF generator service.
#[derive(Parser, Debug)]
#[command(
    name = "ksef-pdf",
    version,
    about = "Render KSeF invoice and UPO PDFs through the PDF generator service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Base URL of the PDF generator service.
    #[arg(long, env = "KSEF_PDF_DOMAIN", global = true)]
    domain: Option<String>,

    /// API token sent in the x-api-token header.
    #[arg(long, env = "KSEF_PDF_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Per-request timeout in seconds (default: none).
    #[arg(long, env = "KSEF_PDF_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// TCP connect timeout in seconds (default: none).
    #[arg(long, env = "KSEF_PDF_CONNECT_TIMEOUT", global = true)]
    connect_timeout: Option<u64>,

    /// Print a JSON summary on stdout. Requires --output.
    #[arg(long, env = "KSEF_PDF_JSON", global = true)]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "KSEF_PDF_NO_PROGRESS", global = true)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "KSEF_PDF_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "KSEF_PDF_QUIET", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an invoice PDF.
    Invoice {
        #[command(flatten)]
        io: IoArgs,

        /// KSeF number of the invoice (sent as nrKSeF).
        #[arg(long)]
        nr_ksef: String,

        /// QR code token printed on the invoice.
        #[arg(long)]
        qr_code: String,
    },
    /// Render a UPO (confirmation of receipt) PDF.
    Upo {
        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(Args, Debug)]
struct IoArgs {
    /// XML source file, or '-' for stdin.
    #[arg(long)]
    xml: PathBuf,

    /// Write the PDF to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Command {
    fn kind(&self) -> PdfKind {
        match self {
            Command::Invoice { .. } => PdfKind::Invoice,
            Command::Upo { .. } => PdfKind::Upo,
        }
    }

    fn io(&self) -> &IoArgs {
        match self {
            Command::Invoice { io, .. } | Command::Upo { io } => io,
        }
    }
}

/// `--json` summary.
#[derive(Serialize)]
struct Report<'a> {
    kind: PdfKind,
    output: &'a Path,
    bytes: usize,
    elapsed_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already says what is happening; keep INFO logs out of
    // its way unless the user asked for verbose output.
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

    let io_args = cli.command.io();
    if cli.json && io_args.output.is_none() {
        anyhow::bail!("--json writes the summary to stdout; use --output for the PDF");
    }

    let domain = cli
        .domain
        .as_deref()
        .context("Missing --domain (or KSEF_PDF_DOMAIN)")?;
    let client = build_client(&cli)?;
    let xml = read_xml(&io_args.xml).await?;

    // ── Cancellation on Ctrl-C ───────────────────────────────────────────
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let kind = cli.command.kind();
    let spinner = show_progress.then(|| start_spinner(kind));
    let start = Instant::now();

    let result = match &cli.command {
        Command::Invoice {
            nr_ksef, qr_code, ..
        } => {
            client
                .fetch_invoice_pdf_with_cancel(domain, &xml, nr_ksef, qr_code, &cancel)
                .await
        }
        Command::Upo { .. } => client.fetch_upo_pdf_with_cancel(domain, &xml, &cancel).await,
    };

    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let pdf = result.with_context(|| format!("Failed to render {kind} PDF"))?;
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    // ── Output ───────────────────────────────────────────────────────────
    match &io_args.output {
        Some(path) => {
            tokio::fs::write(path, &pdf)
                .await
                .with_context(|| format!("Failed to write output file {}", path.display()))?;

            if cli.json {
                let report = Report {
                    kind,
                    output: path,
                    bytes: pdf.len(),
                    elapsed_ms,
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialise report")?
                );
            } else if !cli.quiet {
                eprintln!(
                    "✔ {} PDF  {} bytes  {}ms  →  {}",
                    kind,
                    pdf.len(),
                    elapsed_ms,
                    path.display()
                );
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&pdf)
                .and_then(|()| handle.flush())
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

/// Map CLI args to a `KsefPdfClient`.
fn build_client(cli: &Cli) -> Result<KsefPdfClient> {
    let token = cli
        .token
        .as_deref()
        .context("Missing --token (or KSEF_PDF_API_TOKEN)")?;

    let mut builder = ClientConfig::builder(token);
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = cli.connect_timeout {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }

    let config = builder.build().context("Invalid configuration")?;
    Ok(KsefPdfClient::from_config(config))
}

/// Read the XML source from a file, or from stdin when the path is `-`.
async fn read_xml(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut xml = String::new();
        tokio::io::stdin()
            .read_to_string(&mut xml)
            .await
            .context("Failed to read XML from stdin")?;
        return Ok(xml);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read XML from {}", path.display()))
}

fn start_spinner(kind: PdfKind) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Rendering");
    bar.set_message(format!("{kind} PDF…"));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
