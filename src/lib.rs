//! Stackconv: convert and inspect multi-dimensional image stacks.
//!
//! An image is a set of planes: the **planar** axes (typically X and Y) are
//! packed inside one buffer and every combination of the **non-planar** axes
//! (Z, channel, time) selects one plane. Stackconv crops the planar axes,
//! restricts the non-planar ones, and streams the selected planes from a
//! source to a destination or into display buffers.
//!
//! # Modules
//!
//! - [`axis`]: axis groups, pixel types and range resolution
//! - [`plane`]: plane buffers, raster encoding and plane enumeration
//! - [`pixel`]: typed sample decoding, encoding and display mapping
//! - [`overwrite`]: the destination overwrite gate
//! - [`dataset`]: source/destination traits and the bundled formats
//! - [`conversion`]: the conversion pipeline and its report
//! - [`inspect`]: display preparation for `show`
//! - [`error`]: error types for stackconv operations

pub mod axis;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod inspect;
pub mod overwrite;
pub mod pixel;
pub mod plane;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};

use dataset::{Destination, Source, SourceOptions, WriterConfig, WriterOption};
use overwrite::{FsProbe, OverwriteGuard, OverwritePolicy};
use plane::TraversalPlan;

pub use error::StackError;

/// The stackconv CLI application.
#[derive(Parser)]
#[command(name = "stackconv")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert an image stack from one format to another.
    Convert(ConvertArgs),
    /// Load the planes of an image stack for display.
    Show(ShowArgs),
}

/// Output format for command reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Restriction and reader flags shared by every command that opens a source.
#[derive(clap::Args)]
struct ReaderArgs {
    /// Crop the planar axes: offset,length pairs in axis order (e.g. 0,128,0,128).
    #[arg(
        short = 'C',
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        value_name = "OFFSET,LENGTH,..."
    )]
    crop: Vec<i64>,

    /// Restrict the non-planar axes: offset,length pairs in axis order.
    #[arg(
        short = 'r',
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        value_name = "OFFSET,LENGTH,..."
    )]
    range: Vec<i64>,

    /// Stitch files with similar names into one dataset.
    #[arg(short = 't', long)]
    stitch: bool,

    /// Split planar channels into separate planes.
    #[arg(short = 's', long)]
    separate: bool,

    /// Expand indexed color to RGB.
    #[arg(short = 'e', long)]
    expand: bool,

    /// Adjust brightness and contrast automatically.
    #[arg(short = 'a', long)]
    autoscale: bool,

    /// Do not group files of a multi-file dataset.
    #[arg(short = 'g', long)]
    nogroup: bool,
}

impl ReaderArgs {
    fn source_options(&self) -> SourceOptions {
        SourceOptions {
            stitch: self.stitch,
            separate: self.separate,
            expand: self.expand,
            autoscale: self.autoscale,
            group_files: !self.nogroup,
        }
    }
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Input dataset.
    input: PathBuf,

    /// Output dataset; its extension selects the writer.
    output: PathBuf,

    /// Use the large-file (64-bit offset) variant of the output format.
    #[arg(short = 'b', long)]
    bigtiff: bool,

    /// Overwrite the output file without asking.
    #[arg(short = 'o', long)]
    overwrite: bool,

    /// Never overwrite the output file.
    #[arg(short = 'n', long)]
    nooverwrite: bool,

    /// Compression codec for the output (none, gzip).
    #[arg(short = 'c', long, env = "STACKCONV_COMPRESSION")]
    compression: Option<String>,

    #[command(flatten)]
    reader: ReaderArgs,

    /// Output format for the report.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,
}

/// Arguments for the show subcommand.
#[derive(clap::Args)]
struct ShowArgs {
    /// Input dataset.
    input: PathBuf,

    /// Render every plane as ASCII art.
    #[arg(short = 'A', long)]
    ascii: bool,

    /// Rescale floating-point planes into [0, 1].
    #[arg(short = 'N', long)]
    normalize: bool,

    /// Column limit for ASCII art.
    #[arg(long, default_value_t = inspect::DEFAULT_ASCII_WIDTH)]
    width: usize,

    #[command(flatten)]
    reader: ReaderArgs,

    /// Output format for the report.
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,
}

/// Run the stackconv CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), StackError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Show(args)) => run_show(args),
        None => {
            println!("stackconv {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert and inspect multi-dimensional image stacks.");
            println!();
            println!("Run 'stackconv --help' for usage information.");
            Ok(())
        }
    }
}

/// Close `source` if `result` is an error, then pass `result` on.
fn close_on_error<T>(
    source: &mut dyn Source,
    result: Result<T, StackError>,
) -> Result<T, StackError> {
    if result.is_err() {
        if let Err(e) = source.close() {
            warn!("Failed to close {}: {}", source.location().display(), e);
        }
    }
    result
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), StackError> {
    let compression = args
        .compression
        .as_deref()
        .map(str::parse::<dataset::Compression>)
        .transpose()?;

    // Settle the overwrite question before anything is opened.
    let policy = OverwritePolicy {
        overwrite: args.overwrite,
        no_overwrite: args.nooverwrite,
    };
    let mut guard = OverwriteGuard::new(policy, FsProbe, overwrite::terminal_confirm());
    guard.check(&args.output)?;

    let mut source = dataset::open_source(&args.input, &args.reader.source_options())?;
    let meta = source.metadata(0).cloned();
    let meta = close_on_error(source.as_mut(), meta)?;
    let plan = close_on_error(
        source.as_mut(),
        TraversalPlan::resolve(&meta, &args.reader.crop, &args.reader.range),
    )?;
    let tasks = close_on_error(source.as_mut(), plan.enumerator(&meta))?;

    let config = WriterConfig {
        compression,
        large_file: args.bigtiff,
    };
    let dest_meta = plan.destination_metadata(&meta);
    let mut destination: Box<dyn Destination> = close_on_error(
        source.as_mut(),
        dataset::create_destination(&args.output, &dest_meta, &config),
    )?;
    let large_file_ignored = config.large_file && !destination.supports(WriterOption::LargeFile);

    println!("{} -> {}", source.format_name(), destination.format_name());
    info!(
        "{} [{}] -> {} [{}]",
        args.input.display(),
        meta.axes_summary(),
        args.output.display(),
        dest_meta.axes_summary()
    );

    let mut report = conversion::run_conversion(
        source.as_mut(),
        destination.as_mut(),
        tasks,
        &conversion::ConvertOptions::default(),
        &mut |_| {},
    )?;

    if plan.is_cropped(&meta) {
        report.add(conversion::ConversionIssue::info(
            conversion::ConversionIssueCode::CropApplied,
            format!("planar axes cropped to {}", dest_meta.axes_summary()),
        ));
    }
    if plan.is_restricted(&meta) {
        report.add(conversion::ConversionIssue::info(
            conversion::ConversionIssueCode::PlaneRangeApplied,
            format!(
                "{} of {} plane(s) selected",
                plan.total_planes(),
                meta.plane_count().unwrap_or(0)
            ),
        ));
    }
    if large_file_ignored {
        report.add(conversion::ConversionIssue::warning(
            conversion::ConversionIssueCode::WriterOptionIgnored,
            format!(
                "--bigtiff ignored: {} writer has no large-file variant",
                report.to
            ),
        ));
    }

    match args.report {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(StackError::ReportJson)?;
            println!("{}", json);
        }
        ReportFormat::Text => {
            println!("Conversion report ({} -> {}):", report.from, report.to);
            print!("{}", report);
        }
    }
    println!(
        "Converted {}/{} planes",
        report.written_planes, report.total_planes
    );
    Ok(())
}

/// Execute the show subcommand.
fn run_show(args: ShowArgs) -> Result<(), StackError> {
    let mut source = dataset::open_source(&args.input, &args.reader.source_options())?;
    let meta = source.metadata(0).cloned();
    let meta = close_on_error(source.as_mut(), meta)?;
    let plan = close_on_error(
        source.as_mut(),
        TraversalPlan::resolve(&meta, &args.reader.crop, &args.reader.range),
    )?;

    let opts = inspect::InspectOptions {
        normalize: args.normalize,
        ascii: args.ascii,
        ascii_width: args.width,
        image_index: 0,
    };
    let report =
        inspect::inspect_dataset(source.as_mut(), &plan, &opts, &mut inspect::NoMonitor)?;

    match args.report {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(StackError::ReportJson)?;
            println!("{}", json);
        }
        ReportFormat::Text => print!("{}", report),
    }
    Ok(())
}
