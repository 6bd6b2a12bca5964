//! cpb - Copy with progress
//!
//! A file copy command that shows a single self-refreshing progress line,
//! powered by copybar.

use clap::{Parser, ValueEnum};
use copybar::{
    ConsoleTerminal, Counter, Error as ProgressError, Progress, ProgressBar, ProgressBuilder,
    ProgressReader, create_progress_bar, finish_progress,
};
use rayon::prelude::*;
use std::fs::{self, File, Metadata};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Size of the buffer each copy reads into.
const CHUNK_SIZE: usize = 256 * 1024;

/// Action caption shown on the progress line.
const COPY_ACTION: &str = "COPY";

/// cpb - Copy files with a progress line
///
/// Copy files with atomic writes while a single terminal line reports the
/// bytes transferred.
///
/// Usage:
///   cpb SOURCE DEST
///   cpb SOURCE... DIRECTORY
///   cpb -t DIRECTORY SOURCE...
#[derive(Parser, Debug)]
#[command(name = "cpb", version, about, long_about = None)]
struct Args {
    /// Source file(s)
    ///
    /// When multiple sources are given, the destination must be a directory.
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Target directory (copy all sources into this directory)
    #[arg(short = 't', long = "target-directory", value_name = "DIRECTORY")]
    target_directory: Option<PathBuf>,

    /// Number of files copied in parallel
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Conflict resolution strategy
    #[arg(short = 'c', long, value_enum, default_value = "overwrite")]
    on_conflict: ConflictStrategy,

    /// How progress is displayed
    #[arg(long, value_enum, default_value = "line")]
    display: DisplayMode,

    /// Disable progress display (same as --display none)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Progress refresh period in milliseconds
    #[arg(long, value_name = "MS", default_value = "125")]
    refresh_ms: u64,

    /// Width of the source and destination captions
    #[arg(long, value_name = "COLUMNS", default_value = "18")]
    caption_width: usize,

    /// Do not call fsync after each file (faster but less safe)
    #[arg(long)]
    no_sync: bool,

    /// Do not preserve file timestamps
    #[arg(long)]
    no_times: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConflictStrategy {
    /// Leave existing files untouched
    Skip,
    /// Replace existing files (default)
    Overwrite,
    /// Fail if destination exists
    Error,
}

impl ConflictStrategy {
    fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DisplayMode {
    /// Single self-refreshing status line
    Line,
    /// indicatif progress bar
    Bar,
    /// No display, print a summary at the end
    None,
}

impl DisplayMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
            Self::None => "none",
        }
    }
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("Source is a directory: {path}")]
    SourceIsDirectory { path: PathBuf },

    #[error("Source does not exist: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Failed to read source metadata: {path}: {source}")]
    SourceMetadata { path: PathBuf, source: io::Error },

    #[error("Target is not a directory: {path}")]
    TargetNotDirectory { path: PathBuf },

    #[error("Missing destination operand after '{operand}'")]
    MissingDestinationOperand { operand: PathBuf },

    #[error("Target '{path}' is not a directory (when copying multiple sources)")]
    MultiSourceTargetNotDirectory { path: PathBuf },

    #[error("Source has no filename: {path}")]
    SourceHasNoFilename { path: PathBuf },

    #[error("Destination is a directory: {path}")]
    DestinationIsDirectory { path: PathBuf },

    #[error("Destination already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Failed to copy file: {path}: {source}")]
    CopyFile { path: PathBuf, source: io::Error },

    #[error("Failed to start progress display: {source}")]
    Progress { source: ProgressError },

    #[error("Failed to build copy thread pool: {source}")]
    ThreadPool { source: rayon::ThreadPoolBuildError },

    #[error("Operation cancelled ({files_copied} files copied, {bytes_copied} bytes)")]
    Cancelled { files_copied: u64, bytes_copied: u64 },
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::SourceIsDirectory { .. }
            | Self::TargetNotDirectory { .. }
            | Self::MissingDestinationOperand { .. }
            | Self::MultiSourceTargetNotDirectory { .. }
            | Self::SourceHasNoFilename { .. } => 2,
            Self::Cancelled { .. } => 130,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone)]
struct EffectiveConfig {
    conflict_policy: ConflictStrategy,
    display: DisplayMode,
    jobs: usize,
    refresh_period: Duration,
    caption_width: usize,
    fsync: bool,
    preserve_timestamps: bool,
    verbose: bool,
}

impl EffectiveConfig {
    fn from_args(args: &Args) -> Self {
        Self {
            conflict_policy: args.on_conflict,
            display: if args.quiet {
                DisplayMode::None
            } else {
                args.display
            },
            jobs: args.jobs.max(1),
            refresh_period: Duration::from_millis(args.refresh_ms),
            caption_width: args.caption_width,
            fsync: !args.no_sync,
            preserve_timestamps: !args.no_times,
            verbose: args.verbose,
        }
    }

    fn print_human_stderr(&self) {
        eprintln!("Effective configuration:");
        eprintln!("  conflict_policy: {}", self.conflict_policy.as_str());
        eprintln!("  display: {}", self.display.as_str());
        eprintln!("  jobs: {}", self.jobs);
        eprintln!("  refresh_period: {:?}", self.refresh_period);
        eprintln!("  caption_width: {}", self.caption_width);
        eprintln!("  fsync: {}", self.fsync);
        eprintln!("  preserve_timestamps: {}", self.preserve_timestamps);
    }
}

/// One source file and where it goes.
#[derive(Debug, Clone)]
struct CopyJob {
    source: PathBuf,
    destination: PathBuf,
    meta: Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Copied(u64),
    Skipped,
    Cancelled,
}

/// The progress display selected on the command line.
enum ProgressDisplay {
    Line(ProgressBar),
    Bar(indicatif::ProgressBar),
    Silent(Counter),
}

impl ProgressDisplay {
    fn new(config: &EffectiveConfig, total: u64) -> Self {
        match config.display {
            DisplayMode::Line => Self::Line(
                ProgressBuilder::new(total)
                    .refresh_period(config.refresh_period)
                    .caption_width(config.caption_width)
                    .terminal(ConsoleTerminal::stdout())
                    .build(),
            ),
            DisplayMode::Bar => Self::Bar(create_progress_bar(total)),
            DisplayMode::None => Self::Silent(Counter::new(total)),
        }
    }

    fn progress(&self) -> &(dyn Progress + Send + Sync) {
        match self {
            Self::Line(bar) => bar,
            Self::Bar(pb) => pb,
            Self::Silent(counter) => counter,
        }
    }

    fn start(&self) -> CliResult<()> {
        match self {
            Self::Line(bar) => bar
                .start()
                .map_err(|source| CliError::Progress { source }),
            Self::Bar(pb) => {
                pb.enable_steady_tick(Duration::from_millis(100));
                Ok(())
            }
            Self::Silent(_) => Ok(()),
        }
    }

    fn caption(&self, job: &CopyJob) {
        match self {
            Self::Line(bar) => bar.set_caption_parts(
                &display_path(&job.source),
                &display_path(&job.destination),
                COPY_ACTION,
            ),
            Self::Bar(pb) => pb.set_message(display_path(&job.source)),
            Self::Silent(_) => {}
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Summary {
    files_copied: u64,
    files_skipped: u64,
    bytes_copied: u64,
    cancelled: bool,
}

fn main() {
    if let Err(error) = run() {
        if let CliError::Cancelled {
            files_copied,
            bytes_copied,
        } = error
        {
            eprintln!(
                "Cancelled after copying {} ({}).",
                plural(files_copied, "file"),
                format_bytes(bytes_copied)
            );
            eprintln!("Re-run with -c skip to resume.");
            std::process::exit(error.exit_code());
        }
        eprintln!("error: {}", error);
        std::process::exit(error.exit_code());
    }
}

fn run() -> CliResult<()> {
    let args = Args::parse();
    let config = EffectiveConfig::from_args(&args);

    let (sources, dest, into_directory) = resolve_sources_and_dest(&args)?;
    let jobs = build_jobs(sources, &dest, into_directory)?;

    if config.verbose {
        config.print_human_stderr();
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel_clone = cancel.clone();
        ctrlc::set_handler(move || {
            if cancel_clone.load(Ordering::Relaxed) {
                eprintln!("\nForce quit.");
                std::process::exit(130);
            }
            cancel_clone.store(true, Ordering::Relaxed);
            eprintln!("\nCancelling... Press Ctrl+C again to abort immediately.");
        })
        .ok();
    }

    let total: u64 = jobs.iter().map(|job| job.meta.len()).sum();
    let display = ProgressDisplay::new(&config, total);
    if let Some(first) = jobs.first() {
        display.caption(first);
    }
    display.start()?;

    let start_time = Instant::now();
    let result = copy_jobs(&jobs, &display, &config, &cancel);
    let duration = start_time.elapsed();

    let finalized = finish_progress(display.progress());

    let summary = result?;
    if summary.cancelled {
        return Err(CliError::Cancelled {
            files_copied: summary.files_copied,
            bytes_copied: summary.bytes_copied,
        });
    }

    if !finalized {
        print_summary(&summary, duration, config.verbose);
    }
    Ok(())
}

fn resolve_sources_and_dest(args: &Args) -> CliResult<(Vec<PathBuf>, PathBuf, bool)> {
    if let Some(ref target_dir) = args.target_directory {
        if !target_dir.is_dir() {
            return Err(CliError::TargetNotDirectory {
                path: target_dir.clone(),
            });
        }
        Ok((args.sources.clone(), target_dir.clone(), true))
    } else if args.sources.len() == 1 {
        Err(CliError::MissingDestinationOperand {
            operand: args.sources[0].clone(),
        })
    } else if args.sources.len() == 2 {
        let src = args.sources[0].clone();
        let dest = args.sources[1].clone();
        let into_directory = dest.is_dir();
        Ok((vec![src], dest, into_directory))
    } else {
        let (sources_slice, dest_slice) = args.sources.split_at(args.sources.len() - 1);
        let dest = &dest_slice[0];

        if !dest.is_dir() {
            return Err(CliError::MultiSourceTargetNotDirectory { path: dest.clone() });
        }

        Ok((sources_slice.to_vec(), dest.clone(), true))
    }
}

fn build_jobs(sources: Vec<PathBuf>, dest: &Path, into_directory: bool) -> CliResult<Vec<CopyJob>> {
    let mut jobs = Vec::with_capacity(sources.len());
    for source in sources {
        let meta = match source.metadata() {
            Ok(meta) => meta,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(CliError::SourceNotFound { path: source });
            }
            Err(error) => {
                return Err(CliError::SourceMetadata {
                    path: source,
                    source: error,
                });
            }
        };
        if meta.is_dir() {
            return Err(CliError::SourceIsDirectory { path: source });
        }

        let destination = if into_directory {
            let Some(name) = source.file_name() else {
                return Err(CliError::SourceHasNoFilename { path: source });
            };
            dest.join(name)
        } else {
            dest.to_path_buf()
        };

        jobs.push(CopyJob {
            source,
            destination,
            meta,
        });
    }
    Ok(jobs)
}

fn copy_jobs(
    jobs: &[CopyJob],
    display: &ProgressDisplay,
    config: &EffectiveConfig,
    cancel: &AtomicBool,
) -> CliResult<Summary> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
        .map_err(|source| CliError::ThreadPool { source })?;

    let outcomes: Vec<CliResult<Outcome>> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                if cancel.load(Ordering::Relaxed) {
                    return Ok(Outcome::Cancelled);
                }
                display.caption(job);
                copy_one(job, display.progress(), config, cancel)
            })
            .collect()
    });

    let mut summary = Summary::default();
    for outcome in outcomes {
        match outcome? {
            Outcome::Copied(bytes) => {
                summary.files_copied += 1;
                summary.bytes_copied += bytes;
            }
            Outcome::Skipped => summary.files_skipped += 1,
            Outcome::Cancelled => summary.cancelled = true,
        }
    }
    Ok(summary)
}

/// Copy one file atomically through a progress-counting reader.
///
/// Data goes to a temp file in the destination directory, which is then
/// renamed over the destination.
fn copy_one(
    job: &CopyJob,
    progress: &(dyn Progress + Send + Sync),
    config: &EffectiveConfig,
    cancel: &AtomicBool,
) -> CliResult<Outcome> {
    let dst = &job.destination;
    let copy_err = |source: io::Error| CliError::CopyFile {
        path: job.source.clone(),
        source,
    };

    if let Ok(dst_meta) = fs::symlink_metadata(dst) {
        if dst_meta.is_dir() {
            return Err(CliError::DestinationIsDirectory { path: dst.clone() });
        }
        match config.conflict_policy {
            ConflictStrategy::Skip => {
                progress.add(job.meta.len());
                return Ok(Outcome::Skipped);
            }
            ConflictStrategy::Error => {
                return Err(CliError::AlreadyExists { path: dst.clone() });
            }
            ConflictStrategy::Overwrite => {}
        }
    }

    let src_file = File::open(&job.source).map_err(copy_err)?;
    let dst_parent = match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dst_parent).map_err(copy_err)?;

    let mut reader = ProgressReader::new(src_file, progress);
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut bytes_copied = 0u64;
    loop {
        if cancel.load(Ordering::Relaxed) {
            // temp_file is removed on drop
            return Ok(Outcome::Cancelled);
        }
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(copy_err(error)),
        };
        temp_file.write_all(&buf[..n]).map_err(copy_err)?;
        bytes_copied += n as u64;
    }

    if config.fsync {
        temp_file.as_file().sync_all().map_err(copy_err)?;
    }
    fs::set_permissions(temp_file.path(), job.meta.permissions()).map_err(copy_err)?;

    // - Overwrite mode: use persist() to replace a file created meanwhile
    // - Skip/Error mode: use persist_noclobber() to detect the race
    if config.conflict_policy == ConflictStrategy::Overwrite {
        temp_file.persist(dst).map_err(|e| copy_err(e.error))?;
    } else if let Err(e) = temp_file.persist_noclobber(dst) {
        if e.error.kind() != io::ErrorKind::AlreadyExists {
            return Err(copy_err(e.error));
        }
        if config.conflict_policy == ConflictStrategy::Skip {
            return Ok(Outcome::Skipped);
        }
        return Err(CliError::AlreadyExists { path: dst.clone() });
    }

    if config.preserve_timestamps {
        let atime = filetime::FileTime::from_last_access_time(&job.meta);
        let mtime = filetime::FileTime::from_last_modification_time(&job.meta);
        // Ignore timestamp errors - they're not critical
        let _ = filetime::set_file_times(dst, atime, mtime);
    }

    Ok(Outcome::Copied(bytes_copied))
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn print_summary(summary: &Summary, duration: Duration, verbose: bool) {
    if summary.files_copied == 0 {
        if summary.files_skipped > 0 {
            println!(
                "Nothing to copy ({} skipped)",
                plural(summary.files_skipped, "file")
            );
        } else {
            println!("Nothing to copy");
        }
        return;
    }

    let bytes_str = format_bytes(summary.bytes_copied);

    if verbose {
        println!("Copy completed in {:?}", duration);
        println!("  Files copied:   {}", summary.files_copied);
        println!("  Files skipped:  {}", summary.files_skipped);
        println!("  Total size:     {}", bytes_str);

        if duration.as_secs_f64() > 0.0 {
            let speed = summary.bytes_copied as f64 / duration.as_secs_f64();
            println!("  Speed:          {}/s", format_bytes(speed as u64));
        }
    } else {
        let mut line = format!(
            "Copied {} ({}) in {:.2?}",
            plural(summary.files_copied, "file"),
            bytes_str,
            duration
        );
        if summary.files_skipped > 0 {
            line.push_str(&format!(", skipped {}", summary.files_skipped));
        }
        println!("{}", line);
    }
}

fn plural(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
