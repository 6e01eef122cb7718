//! pagecrop CLI - region capture and table extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagecrop::extract::DEFAULT_ENDPOINT;
use pagecrop::{
    detect_format_from_path, to_json, ExtractOptions, ExtractionGateway, HttpRecognizer,
    ImageRasterizer, JsonFormat, NotificationLevel, RegionSpec, Session, TableSet,
};

#[derive(Parser)]
#[command(name = "pagecrop")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Capture document regions and extract tables from them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show page count and dimensions
    Info {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print page information as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export every page raster as PNG
    Pages {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Capture regions and export them as PNG
    Capture {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Region as PAGE:X,Y,WIDTH,HEIGHT in document units (page is 1-based)
        #[arg(short, long = "region", value_name = "SPEC", required = true)]
        regions: Vec<RegionSpec>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Capture regions and extract tables from each capture
    Extract {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Region as PAGE:X,Y,WIDTH,HEIGHT in document units (page is 1-based)
        #[arg(short, long = "region", value_name = "SPEC", required = true)]
        regions: Vec<RegionSpec>,

        /// Recognition service base URL
        #[arg(long, env = "PAGECROP_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        /// Timeout per capture, in seconds
        #[arg(long, env = "PAGECROP_TIMEOUT", default_value = "30")]
        timeout: u64,

        /// Directory for table_<id>.csv files
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Also print the tables as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the recognition service
    Health {
        /// Recognition service base URL
        #[arg(long, env = "PAGECROP_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info { input, json } => cmd_info(&input, json),
        Commands::Pages { input, output } => cmd_pages(&input, output.as_deref()),
        Commands::Capture {
            input,
            regions,
            output,
        } => cmd_capture(&input, &regions, output.as_deref()),
        Commands::Extract {
            input,
            regions,
            endpoint,
            timeout,
            output,
            json,
        } => cmd_extract(
            &input,
            &regions,
            &endpoint,
            Duration::from_secs(timeout),
            output.as_deref(),
            json,
        ),
        Commands::Health { endpoint } => cmd_health(&endpoint),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    PathBuf::from(format!("{}_{}", stem, suffix))
}

/// Load `input` into a fresh session.
fn open_session(rt: &tokio::runtime::Runtime, input: &Path) -> CliResult<Session> {
    let data = fs::read(input)?;
    let mut session = Session::new();
    let pages = rt.block_on(session.load(Arc::new(ImageRasterizer::new()), data))?;
    log::debug!("Loaded {} page(s) from {}", pages, input.display());
    Ok(session)
}

/// Replay region specs and capture them, reporting specs that did not commit.
fn capture_regions(session: &mut Session, specs: &[RegionSpec]) -> CliResult<()> {
    for spec in specs {
        if session.select_spec(spec)?.is_none() {
            println!(
                "{} page {} region {}x{} is too small, skipped",
                "Warning:".yellow(),
                spec.page_index + 1,
                spec.rect.width,
                spec.rect.height
            );
        }
    }
    session.capture_selections()?;
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> CliResult<()> {
    let format = detect_format_from_path(input)?;
    let rt = runtime()?;
    let session = open_session(&rt, input)?;
    let pages = session.pages().info();

    if json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Pages".bold(), pages.len());

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for page in &pages {
        println!(
            "{} {:>3}: {}x{} px (display {}x{})",
            "Page".bold(),
            page.index + 1,
            page.native_width,
            page.native_height,
            page.display_width,
            page.display_height
        );
    }

    Ok(())
}

fn cmd_pages(input: &Path, output: Option<&Path>) -> CliResult<()> {
    let rt = runtime()?;
    let mut session = open_session(&rt, input)?;

    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, "pages"));
    let written = session.export_pages(&output_dir)?;

    for path in &written {
        println!("{} {}", "Exported".green(), path.display());
    }
    println!("\n{} {} pages exported", "Done!".green().bold(), written.len());

    Ok(())
}

fn cmd_capture(input: &Path, specs: &[RegionSpec], output: Option<&Path>) -> CliResult<()> {
    let rt = runtime()?;
    let mut session = open_session(&rt, input)?;
    capture_regions(&mut session, specs)?;

    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, "captures"));
    let written = session.export_captures(&output_dir)?;

    for (capture, path) in session.captures().iter().zip(&written) {
        let (width, height) = capture.dimensions();
        println!(
            "{} {} ({}x{} from page {})",
            "Captured".green(),
            path.display(),
            width,
            height,
            capture.source_page_index + 1
        );
    }
    println!("\n{} {} captures exported", "Done!".green().bold(), written.len());

    Ok(())
}

fn cmd_extract(
    input: &Path,
    specs: &[RegionSpec],
    endpoint: &str,
    timeout: Duration,
    output: Option<&Path>,
    json: bool,
) -> CliResult<()> {
    let rt = runtime()?;
    let mut session = open_session(&rt, input)?;
    capture_regions(&mut session, specs)?;

    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, "tables"));
    let options = ExtractOptions::new()
        .with_endpoint(endpoint)
        .with_timeout(timeout)
        .with_artifact_dir(&output_dir);
    let gateway = ExtractionGateway::new(HttpRecognizer::from_options(&options), options);

    let captures = session.captures().captures().to_vec();
    let pb = ProgressBar::new(captures.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut extracted = Vec::new();
    for capture in &captures {
        pb.set_message(format!("capture {}", capture.id));
        let result = rt.block_on(gateway.extract(capture));
        session.report_extraction(capture.id, &result);
        if let Ok(extraction) = result {
            extracted.push(extraction);
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!();
    for extraction in &extracted {
        if let Some(path) = &extraction.artifact {
            println!(
                "{} {} ({} tables)",
                "Saved".green(),
                path.display(),
                extraction.tables.len()
            );
        }
    }
    for notification in session.notifications().all() {
        if notification.level == NotificationLevel::Error {
            println!("{} {}", "Failed".red(), notification);
        }
    }

    if json {
        let tables = TableSet::new(
            extracted
                .into_iter()
                .flat_map(|e| e.tables.tables)
                .collect(),
        );
        println!("{}", to_json(&tables, JsonFormat::Pretty)?);
    }

    Ok(())
}

fn cmd_health(endpoint: &str) -> CliResult<()> {
    let rt = runtime()?;
    let recognizer = HttpRecognizer::new(endpoint);
    let health = rt.block_on(recognizer.health())?;

    let status = if health.is_healthy() {
        health.status.green()
    } else {
        health.status.yellow()
    };
    println!("{}: {}", "Service".bold(), endpoint);
    println!("{}: {}", "Status".bold(), status);
    println!(
        "{}: {}",
        "Recognition backend".bold(),
        if health.textract_available { "Available" } else { "Unavailable" }
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pagecrop".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document region capture and table extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pagecrop".dimmed());
    println!("License: MIT");
}
