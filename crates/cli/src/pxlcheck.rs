//! pxlcheck - Validate PCL XL print jobs
//!
//! Runs each job through the attribute, sequence and dispatch checks and
//! reports the first violation, or a summary when the job is clean.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use memmap2::Mmap;
use pxl_core::interp::{Interpreter, RecordingDevice};
use pxl_core::{InterpreterOptions, PxlError};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Validate PCL XL print jobs.
#[derive(Parser, Debug)]
#[command(name = "pxlcheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more PCL XL job files, optionally PJL-wrapped
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Log dispatched operators (-v) or every scanned token (-vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print the device event transcript of each job
    #[arg(short, long, action = ArgAction::SetTrue)]
    events: bool,

    /// Print one JSON report per file instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Accept attributes introduced after the stream's protocol level
    #[arg(long, action = ArgAction::SetTrue)]
    lenient: bool,

    /// Maximum ExecStream nesting depth
    #[arg(long, default_value_t = 8)]
    max_stream_nesting: usize,
}

#[derive(Debug, Serialize)]
struct ErrorReport {
    kind: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct Report {
    file: String,
    version: String,
    operators: usize,
    pages: usize,
    state: String,
    error: Option<ErrorReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<String>>,
}

impl Report {
    fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match &self.error {
            None => writeln!(
                out,
                "{}: ok, {}, {} operators, {} pages",
                self.file, self.version, self.operators, self.pages
            )?,
            Some(err) => writeln!(
                out,
                "{}: error [{}] {} ({}, after {} operators, in {})",
                self.file, err.kind, err.message, self.version, self.operators, self.state
            )?,
        }
        for line in self.events.iter().flatten() {
            writeln!(out, "    {line}")?;
        }
        Ok(())
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pxl_core={level},pxlcheck={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn check_file(path: &Path, args: &Args) -> Result<Report> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mmap =
        unsafe { Mmap::map(&file) }.with_context(|| format!("cannot map {}", path.display()))?;
    debug!(file = %path.display(), len = mmap.len(), "checking");

    let options = InterpreterOptions::default()
        .with_max_stream_nesting(args.max_stream_nesting)
        .with_strict_attribute_versions(!args.lenient);

    let mut device = RecordingDevice::new();
    let mut interp = Interpreter::with_options(&mut device, options);
    let result = interp.run(&mmap).and_then(|()| interp.check_complete());
    let version = interp.version().to_string();
    let operators = interp.operator_count();
    let pages = interp.page_count();
    let state = interp.state().to_string();

    let error = result.err().map(|err: PxlError| ErrorReport {
        kind: format!("{:?}", err.kind()),
        message: err.to_string(),
    });
    let events = args
        .events
        .then(|| device.events().iter().map(ToString::to_string).collect());

    Ok(Report {
        file: path.display().to_string(),
        version,
        operators,
        pages,
        state,
        error,
        events,
    })
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut out = BufWriter::new(io::stdout());
    let mut failed = false;

    for path in &args.files {
        let report = check_file(path, &args)?;
        failed |= report.error.is_some();
        if args.json {
            serde_json::to_writer(&mut out, &report)?;
            writeln!(out)?;
        } else {
            report.write_text(&mut out)?;
        }
    }

    out.flush()?;
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
